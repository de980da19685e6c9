use crate::error::TypeError;
use crate::ethernet::EthernetRecord;
use crate::icmp::IcmpRecord;
use crate::record_kind::RecordKind;

/// The decoded record of an IPFIX set, dispatched on the set id.
///
/// `Unsupported` is an outcome, not an error: the collector only understands
/// a subset of record layouts and reports the others without reading them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowRecord {
  Ethernet(EthernetRecord),
  Icmp(IcmpRecord),
  Unsupported { set_id: u16 },
}

impl FlowRecord {
  pub fn kind(&self) -> RecordKind {
    match self {
      Self::Ethernet(_) => RecordKind::Ethernet,
      Self::Icmp(_) => RecordKind::Icmp,
      Self::Unsupported { set_id } => RecordKind::Unsupported(*set_id),
    }
  }

  pub fn set_id(&self) -> u16 {
    self.kind().set_id()
  }

  /// `true` for the known layouts, `false` for `Unsupported`.
  pub fn is_supported(&self) -> bool {
    !matches!(self, Self::Unsupported { .. })
  }

  /// Serialize the record body. `Unsupported` has no body.
  pub fn encode_body(&self) -> Vec<u8> {
    match self {
      Self::Ethernet(r) => r.encode_body(),
      Self::Icmp(r) => r.encode_body(),
      Self::Unsupported { .. } => Vec::new(),
    }
  }

  /// Decode a record body, dispatching on the layout selected by the set id.
  ///
  /// # Errors
  ///
  /// - [`TypeError::ShortBody`] if `body` is shorter than the layout.
  /// - [`TypeError::NoLayout`] for [`RecordKind::Unsupported`].
  pub fn decode_body(kind: RecordKind, body: &[u8]) -> Result<Self, TypeError> {
    match kind {
      RecordKind::Ethernet => Ok(Self::Ethernet(EthernetRecord::decode_body(body)?)),
      RecordKind::Icmp => Ok(Self::Icmp(IcmpRecord::decode_body(body)?)),
      RecordKind::Unsupported(set_id) => Err(TypeError::NoLayout { set_id }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dispatch_by_kind() {
    let eth = EthernetRecord {
      obs_point_id: 1,
      ..EthernetRecord::default()
    };
    let decoded = FlowRecord::decode_body(RecordKind::Ethernet, &eth.encode_body()).unwrap();
    assert_eq!(decoded, FlowRecord::Ethernet(eth));
    assert_eq!(decoded.set_id(), 256);

    let icmp = IcmpRecord {
      icmp_type: 3,
      ..IcmpRecord::default()
    };
    let decoded = FlowRecord::decode_body(RecordKind::Icmp, &icmp.encode_body()).unwrap();
    assert_eq!(decoded.kind(), RecordKind::Icmp);
    assert!(decoded.is_supported());
  }

  #[test]
  fn unsupported_has_no_layout() {
    assert_eq!(
      FlowRecord::decode_body(RecordKind::Unsupported(300), &[]),
      Err(TypeError::NoLayout { set_id: 300 })
    );
    let record = FlowRecord::Unsupported { set_id: 300 };
    assert!(!record.is_supported());
    assert!(record.encode_body().is_empty());
    assert_eq!(record.set_id(), 300);
  }
}
