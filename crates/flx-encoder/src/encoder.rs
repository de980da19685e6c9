use flx_types::FlowRecord;
use flx_wire::header::{IPFIX_VERSION, MESSAGE_HEADER_LEN, SET_HEADER_LEN};
use flx_wire::{MessageHeader, SetHeader};

use crate::error::EncodeError;

/// IPFIX datagram builder, the inverse of `IpfixDecoder::decode`.
///
/// Produces one message carrying exactly one set. Length fields are
/// computed from the encoded set unless overridden with
/// [`declared_lengths`](Self::declared_lengths), which exists to produce
/// datagrams whose headers disagree with their contents.
///
/// ```rust
/// use flx_encoder::IpfixEncoder;
/// use flx_types::{EthernetRecord, FlowRecord};
///
/// let datagram = IpfixEncoder::new()
///     .sequence(1)
///     .observation_domain(7)
///     .record(FlowRecord::Ethernet(EthernetRecord {
///         obs_point_id: 42,
///         packets: 100,
///         ..EthernetRecord::default()
///     }))
///     .encode()
///     .unwrap();
///
/// assert_eq!(datagram.len(), 16 + 4 + 45);
/// ```
///
/// Output layout:
///
/// ```text
/// ┌────────────┬───────────────────────────────────────────┐
/// │ [16 bytes] │ message header                            │
/// │ [4 bytes]  │ set header (set id, set length)           │
/// │ [N bytes]  │ record body (45 ethernet, 93 icmp, raw)   │
/// └────────────┴───────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug)]
pub struct IpfixEncoder {
    version: u16,
    export_time: u32,
    seq_number: u32,
    obs_domain_id: u32,
    set: Option<PendingSet>,
    declared_message_len: Option<u16>,
    declared_set_len: Option<u16>,
}

#[derive(Clone, Debug)]
struct PendingSet {
    set_id: u16,
    body: Vec<u8>,
}

impl Default for IpfixEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl IpfixEncoder {
    /// Create an encoder for an IPFIX (version 10) message with all header
    /// fields zeroed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: IPFIX_VERSION,
            export_time: 0,
            seq_number: 0,
            obs_domain_id: 0,
            set: None,
            declared_message_len: None,
            declared_set_len: None,
        }
    }

    pub fn version(&mut self, version: u16) -> &mut Self {
        self.version = version;
        self
    }

    pub fn export_time(&mut self, export_time: u32) -> &mut Self {
        self.export_time = export_time;
        self
    }

    pub fn sequence(&mut self, seq_number: u32) -> &mut Self {
        self.seq_number = seq_number;
        self
    }

    pub fn observation_domain(&mut self, obs_domain_id: u32) -> &mut Self {
        self.obs_domain_id = obs_domain_id;
        self
    }

    /// Carry `record` as the message's only set. `Unsupported` records
    /// produce a set header with an empty body.
    pub fn record(&mut self, record: FlowRecord) -> &mut Self {
        self.set = Some(PendingSet {
            set_id: record.set_id(),
            body: record.encode_body(),
        });
        self
    }

    /// Carry an arbitrary set id with an opaque body.
    pub fn raw_set(&mut self, set_id: u16, body: &[u8]) -> &mut Self {
        self.set = Some(PendingSet {
            set_id,
            body: body.to_vec(),
        });
        self
    }

    /// Override the length fields written into the message and set headers.
    pub fn declared_lengths(&mut self, message: u16, set: u16) -> &mut Self {
        self.declared_message_len = Some(message);
        self.declared_set_len = Some(set);
        self
    }

    /// Serialize the message.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::MissingSet`] if no set was added.
    /// - [`EncodeError::LengthOverflow`] if a computed length exceeds 65535.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let set = self.set.as_ref().ok_or(EncodeError::MissingSet)?;

        let set_len = match self.declared_set_len {
            Some(len) => len,
            None => length_field("set", SET_HEADER_LEN + set.body.len())?,
        };
        let message_len = match self.declared_message_len {
            Some(len) => len,
            None => length_field(
                "message",
                MESSAGE_HEADER_LEN + SET_HEADER_LEN + set.body.len(),
            )?,
        };

        let header = MessageHeader {
            version: self.version,
            length: message_len,
            export_time: self.export_time,
            seq_number: self.seq_number,
            obs_domain_id: self.obs_domain_id,
        };
        let set_header = SetHeader {
            set_id: set.set_id,
            length: set_len,
        };

        let mut out =
            Vec::with_capacity(MESSAGE_HEADER_LEN + SET_HEADER_LEN + set.body.len());
        header.write_to(&mut out);
        set_header.write_to(&mut out);
        out.extend_from_slice(&set.body);
        Ok(out)
    }
}

fn length_field(structure: &'static str, len: usize) -> Result<u16, EncodeError> {
    u16::try_from(len).map_err(|_| EncodeError::LengthOverflow {
        structure,
        len,
        bits: 16,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flx_types::{EthernetRecord, IcmpRecord};

    #[test]
    fn computes_lengths() {
        let bytes = IpfixEncoder::new()
            .record(FlowRecord::Icmp(IcmpRecord::default()))
            .encode()
            .unwrap();
        assert_eq!(bytes.len(), 16 + 4 + 93);
        // message length
        assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]), 113);
        // set id and set length
        assert_eq!(u16::from_be_bytes([bytes[16], bytes[17]]), 266);
        assert_eq!(u16::from_be_bytes([bytes[18], bytes[19]]), 97);
    }

    #[test]
    fn declared_lengths_are_written_verbatim() {
        let bytes = IpfixEncoder::new()
            .record(FlowRecord::Ethernet(EthernetRecord::default()))
            .declared_lengths(40, 45)
            .encode()
            .unwrap();
        assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]), 40);
        assert_eq!(u16::from_be_bytes([bytes[18], bytes[19]]), 45);
        assert_eq!(bytes.len(), 65);
    }

    #[test]
    fn header_fields_in_order() {
        let bytes = IpfixEncoder::new()
            .version(9)
            .export_time(0x0102_0304)
            .sequence(5)
            .observation_domain(6)
            .raw_set(300, b"abcd")
            .encode()
            .unwrap();
        assert_eq!(&bytes[0..2], &[0, 9]);
        assert_eq!(&bytes[4..8], &[1, 2, 3, 4]);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 5]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 6]);
        assert_eq!(&bytes[20..], b"abcd");
    }

    #[test]
    fn missing_set_is_an_error() {
        assert!(matches!(
            IpfixEncoder::new().encode(),
            Err(EncodeError::MissingSet)
        ));
    }

    #[test]
    fn oversized_body_overflows_length_field() {
        let body = vec![0u8; usize::from(u16::MAX)];
        let result = IpfixEncoder::new().raw_set(999, &body).encode();
        assert!(matches!(
            result,
            Err(EncodeError::LengthOverflow { structure: "set", .. })
        ));
    }
}
