/// Errors that can occur while building a datagram.
///
/// ```text
///   EncodeError
///   ├── MissingSet      ← encode() called before record() / raw_set()
///   └── LengthOverflow  ← a computed length does not fit its wire field
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("no set has been added to the encoder")]
    MissingSet,

    #[error("{structure} length {len} does not fit its {bits}-bit length field")]
    LengthOverflow {
        structure: &'static str,
        len: usize,
        bits: u32,
    },
}
