use crate::ethernet::EthernetRecord;
use crate::icmp::IcmpRecord;

/// Set id of the ethernet flow record layout.
pub const ETHERNET_SET_ID: u16 = 256;

/// Set id of the ICMP flow record layout.
pub const ICMP_SET_ID: u16 = 266;

/// Record layout selected by a set header's `set_id`.
///
/// ```text
/// ┌────────┬─────────────┬──────────────────────┐
/// │ Set id │ Variant     │ Fixed body length    │
/// ├────────┼─────────────┼──────────────────────┤
/// │ 256    │ Ethernet    │ 45 bytes             │
/// │ 266    │ Icmp        │ 93 bytes             │
/// │ other  │ Unsupported │ none, nothing read   │
/// └────────┴─────────────┴──────────────────────┘
/// ```
///
/// The body length depends on the tag alone; length fields declared in the
/// message or set header never change it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Ethernet,
    Icmp,
    /// A set id this collector has no layout for. The raw id is kept for
    /// reporting.
    Unsupported(u16),
}

impl RecordKind {
    pub fn from_set_id(set_id: u16) -> Self {
        match set_id {
            ETHERNET_SET_ID => Self::Ethernet,
            ICMP_SET_ID => Self::Icmp,
            other => Self::Unsupported(other),
        }
    }

    pub fn set_id(self) -> u16 {
        match self {
            Self::Ethernet => ETHERNET_SET_ID,
            Self::Icmp => ICMP_SET_ID,
            Self::Unsupported(id) => id,
        }
    }

    /// Fixed wire length of the record body, or `None` for unsupported sets.
    pub fn body_len(self) -> Option<usize> {
        match self {
            Self::Ethernet => Some(EthernetRecord::LEN),
            Self::Icmp => Some(IcmpRecord::LEN),
            Self::Unsupported(_) => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::Icmp => "icmp",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_roundtrip() {
        for (kind, id, len) in [
            (RecordKind::Ethernet, 256, 45),
            (RecordKind::Icmp, 266, 93),
        ] {
            assert_eq!(RecordKind::from_set_id(id), kind);
            assert_eq!(kind.set_id(), id);
            assert_eq!(kind.body_len(), Some(len));
        }
    }

    #[test]
    fn unknown_id_preserved() {
        for id in [0, 2, 3, 255, 257, 265, 267, u16::MAX] {
            let kind = RecordKind::from_set_id(id);
            assert_eq!(kind, RecordKind::Unsupported(id));
            assert_eq!(kind.set_id(), id);
            assert_eq!(kind.body_len(), None);
        }
    }
}
