use bytes::Buf;
use flx_types::{FlowRecord, RecordKind};
use flx_wire::header::{MESSAGE_HEADER_LEN, SET_HEADER_LEN};
use flx_wire::{MessageHeader, SetHeader, try_pull};
use tracing::{debug, trace};

use crate::config::{DecoderConfig, LengthCheck};
use crate::error::DecodeError;

/// One decoded IPFIX datagram: a message header, its single set header and
/// the record the set id selected.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────┐
/// │ IpfixMessage                                            │
/// │   header: MessageHeader  ← version, length, seq, domain │
/// │   set:    SetHeader      ← set id, declared length      │
/// │   record: FlowRecord     ← Ethernet | Icmp | Unsupported│
/// └─────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IpfixMessage {
    pub header: MessageHeader,
    pub set: SetHeader,
    pub record: FlowRecord,
}

/// IPFIX datagram decoder, the inverse of `IpfixEncoder::encode`.
///
/// Decoding proceeds in four steps, each a fixed-size pull from the front
/// of the buffer:
///
///   1. **Message header**: 16 bytes, else `TruncatedHeader`.
///   2. **Set header**: 4 bytes, else `TruncatedSetHeader`.
///   3. **Dispatch**: set ids other than 256 and 266 stop here and yield
///      `FlowRecord::Unsupported`. This is a normal outcome.
///   4. **Record**: exactly the layout's fixed length (45 or 93 bytes),
///      else `TruncatedRecord`. Bytes past the record are ignored.
///
/// Declared lengths never size the record pull. With
/// [`LengthCheck::Strict`] they are cross-checked once the record has been
/// read.
///
/// # Example
///
/// ```rust
/// use flx_decoder::{DecoderConfig, IpfixDecoder};
/// use flx_encoder::IpfixEncoder;
/// use flx_types::{EthernetRecord, FlowRecord};
///
/// let datagram = IpfixEncoder::new()
///     .sequence(1)
///     .record(FlowRecord::Ethernet(EthernetRecord {
///         obs_point_id: 42,
///         ..EthernetRecord::default()
///     }))
///     .encode()
///     .unwrap();
///
/// let message = IpfixDecoder::decode(&datagram, &DecoderConfig::default()).unwrap();
/// assert_eq!(message.set.set_id, 256);
/// ```
pub struct IpfixDecoder;

impl IpfixDecoder {
    /// Decode one datagram.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::TruncatedHeader`] if fewer than 16 bytes are given.
    /// - [`DecodeError::TruncatedSetHeader`] if fewer than 4 bytes follow.
    /// - [`DecodeError::TruncatedRecord`] if a known layout is cut short.
    /// - [`DecodeError::LengthMismatch`] under [`LengthCheck::Strict`] when
    ///   a declared length disagrees with the decoded structure.
    pub fn decode(datagram: &[u8], config: &DecoderConfig) -> Result<IpfixMessage, DecodeError> {
        let mut buf = datagram;

        let header = MessageHeader::read_from(&mut buf).map_err(|_| DecodeError::TruncatedHeader {
            available: datagram.len(),
        })?;
        let set = SetHeader::read_from(&mut buf).map_err(|_| DecodeError::TruncatedSetHeader {
            available: buf.remaining(),
        })?;

        let kind = RecordKind::from_set_id(set.set_id);
        let Some(body_len) = kind.body_len() else {
            debug!(set_id = set.set_id, seq = header.seq_number, "unsupported set");
            if config.length_check == LengthCheck::Strict {
                check_message_len(&header, &set)?;
            }
            return Ok(IpfixMessage {
                header,
                set,
                record: FlowRecord::Unsupported { set_id: set.set_id },
            });
        };

        let available = buf.remaining();
        let body = try_pull(&mut buf, body_len).ok_or(DecodeError::TruncatedRecord {
            set_id: set.set_id,
            needed: body_len,
            available,
        })?;

        if config.length_check == LengthCheck::Strict {
            check_set_len(&set, body_len)?;
            check_message_len(&header, &set)?;
        }

        let record = FlowRecord::decode_body(kind, &body)?;
        trace!(
            set_id = set.set_id,
            record = kind.name(),
            seq = header.seq_number,
            domain = header.obs_domain_id,
            "decoded ipfix message"
        );

        Ok(IpfixMessage {
            header,
            set,
            record,
        })
    }
}

fn check_set_len(set: &SetHeader, body_len: usize) -> Result<(), DecodeError> {
    let actual = SET_HEADER_LEN + body_len;
    if usize::from(set.length) != actual {
        return Err(DecodeError::LengthMismatch {
            structure: "set",
            declared: usize::from(set.length),
            actual,
        });
    }
    Ok(())
}

fn check_message_len(header: &MessageHeader, set: &SetHeader) -> Result<(), DecodeError> {
    let actual = MESSAGE_HEADER_LEN + usize::from(set.length);
    if usize::from(header.length) != actual {
        return Err(DecodeError::LengthMismatch {
            structure: "message",
            declared: usize::from(header.length),
            actual,
        });
    }
    Ok(())
}
