use std::fmt;

use bytes::{Buf, BufMut};

use crate::error::WireError;
use crate::pull::try_pull;

/// Message header size in bytes.
pub const MESSAGE_HEADER_LEN: usize = 16;

/// Set header size in bytes.
pub const SET_HEADER_LEN: usize = 4;

/// Protocol version carried by IPFIX messages.
pub const IPFIX_VERSION: u16 = 10;

/// IPFIX message header: the first 16 bytes of every datagram.
///
/// ```text
/// ┌────────┬─────────┬────────────────────────┐
/// │ Offset │ Size    │ Field                  │
/// ├────────┼─────────┼────────────────────────┤
/// │ 0x00   │ 2 bytes │ version                │
/// │ 0x02   │ 2 bytes │ length                 │
/// │ 0x04   │ 4 bytes │ export_time            │
/// │ 0x08   │ 4 bytes │ seq_number             │
/// │ 0x0C   │ 4 bytes │ obs_domain_id          │
/// └────────┴─────────┴────────────────────────┘
/// ```
///
/// All fields are big-endian on the wire and host order once read. The
/// version is not validated: the collector reports whatever it receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u16,
    /// Declared message length in bytes. Not used to bound record reads.
    pub length: u16,
    pub export_time: u32,
    pub seq_number: u32,
    pub obs_domain_id: u32,
}

impl MessageHeader {
    /// Pull a header from the front of `buf`.
    ///
    /// # Errors
    ///
    /// [`WireError::Truncated`] if fewer than [`MESSAGE_HEADER_LEN`] bytes
    /// remain. `buf` is not advanced in that case.
    pub fn read_from<B: Buf>(buf: &mut B) -> Result<Self, WireError> {
        let mut raw = try_pull(buf, MESSAGE_HEADER_LEN).ok_or_else(|| WireError::Truncated {
            structure: "message header",
            needed: MESSAGE_HEADER_LEN,
            available: buf.remaining(),
        })?;

        Ok(Self {
            version: raw.get_u16(),
            length: raw.get_u16(),
            export_time: raw.get_u32(),
            seq_number: raw.get_u32(),
            obs_domain_id: raw.get_u32(),
        })
    }

    /// Append the 16-byte wire form of this header to `buf`.
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.version);
        buf.put_u16(self.length);
        buf.put_u32(self.export_time);
        buf.put_u32(self.seq_number);
        buf.put_u32(self.obs_domain_id);
    }
}

impl fmt::Display for MessageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "header: v{}, length {}, export time {}, seq {}, observation domain {}",
            self.version, self.length, self.export_time, self.seq_number, self.obs_domain_id
        )
    }
}

/// IPFIX set header: 4 bytes introducing the set that follows.
///
/// `set_id` selects the record layout. `length` is carried through for
/// reporting and the optional strict length check only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetHeader {
    pub set_id: u16,
    pub length: u16,
}

impl SetHeader {
    /// Pull a set header from the front of `buf`.
    ///
    /// # Errors
    ///
    /// [`WireError::Truncated`] if fewer than [`SET_HEADER_LEN`] bytes remain.
    pub fn read_from<B: Buf>(buf: &mut B) -> Result<Self, WireError> {
        let mut raw = try_pull(buf, SET_HEADER_LEN).ok_or_else(|| WireError::Truncated {
            structure: "set header",
            needed: SET_HEADER_LEN,
            available: buf.remaining(),
        })?;

        Ok(Self {
            set_id: raw.get_u16(),
            length: raw.get_u16(),
        })
    }

    /// Append the 4-byte wire form of this set header to `buf`.
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16(self.set_id);
        buf.put_u16(self.length);
    }
}

impl fmt::Display for SetHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "set: id {}, length {}", self.set_id, self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_header_reads_big_endian() {
        let bytes: [u8; MESSAGE_HEADER_LEN] = [
            0x00, 0x0A, // version 10
            0x00, 0x28, // length 40
            0x00, 0x00, 0x00, 0x00, // export time
            0x00, 0x00, 0x00, 0x01, // seq 1
            0x00, 0x00, 0x00, 0x07, // domain 7
        ];
        let mut buf = &bytes[..];
        let header = MessageHeader::read_from(&mut buf).unwrap();
        assert_eq!(
            header,
            MessageHeader {
                version: 10,
                length: 40,
                export_time: 0,
                seq_number: 1,
                obs_domain_id: 7,
            }
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn message_header_write_matches_read() {
        let header = MessageHeader {
            version: IPFIX_VERSION,
            length: 0x1234,
            export_time: 0xDEAD_BEEF,
            seq_number: 99,
            obs_domain_id: 0x0102_0304,
        };
        let mut out = Vec::new();
        header.write_to(&mut out);
        assert_eq!(out.len(), MESSAGE_HEADER_LEN);
        assert_eq!(&out[0..4], &[0x00, 0x0A, 0x12, 0x34]);
        assert_eq!(MessageHeader::read_from(&mut &out[..]).unwrap(), header);
    }

    #[test]
    fn message_header_rejects_short_buffer() {
        let bytes = [0u8; MESSAGE_HEADER_LEN - 1];
        let mut buf = &bytes[..];
        let err = MessageHeader::read_from(&mut buf).unwrap_err();
        assert_eq!(
            err,
            WireError::Truncated {
                structure: "message header",
                needed: 16,
                available: 15,
            }
        );
        assert_eq!(buf.len(), 15, "short read must not consume input");
    }

    #[test]
    fn set_header_reads_id_and_length() {
        let mut buf: &[u8] = &[0x01, 0x00, 0x00, 0x2D, 0xFF];
        let set = SetHeader::read_from(&mut buf).unwrap();
        assert_eq!(set.set_id, 256);
        assert_eq!(set.length, 45);
        assert_eq!(buf, &[0xFF]);
    }

    #[test]
    fn set_header_rejects_short_buffer() {
        let mut buf: &[u8] = &[0x01, 0x00, 0x00];
        assert!(matches!(
            SetHeader::read_from(&mut buf),
            Err(WireError::Truncated { available: 3, .. })
        ));
    }

    #[test]
    fn display_matches_collector_output() {
        let header = MessageHeader {
            version: 10,
            length: 40,
            export_time: 0,
            seq_number: 1,
            obs_domain_id: 7,
        };
        assert_eq!(
            header.to_string(),
            "header: v10, length 40, export time 0, seq 1, observation domain 7"
        );
        let set = SetHeader {
            set_id: 266,
            length: 93,
        };
        assert_eq!(set.to_string(), "set: id 266, length 93");
    }
}
