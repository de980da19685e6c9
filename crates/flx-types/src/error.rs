/// Errors raised when interpreting a record body.
///
/// The IPFIX decoder pulls exactly the variant's fixed length before
/// calling into this crate, so on that path these errors signal a caller
/// bug rather than bad input. Direct users of `decode_body` get them for
/// short slices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
  /// The body slice is shorter than the record's fixed wire length.
  #[error("{record} record body too short: need {needed} bytes, got {available}")]
  ShortBody {
    record: &'static str,
    needed: usize,
    available: usize,
  },

  /// `decode_body` was asked for a set id with no known layout.
  #[error("no record layout for set id {set_id}")]
  NoLayout { set_id: u16 },
}
