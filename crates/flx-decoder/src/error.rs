use flx_types::TypeError;
use flx_wire::CursorError;

/// Errors that abort the decode of a single datagram.
///
/// None of these is fatal to the receiver: the per-datagram boundary
/// (`decode_datagram`) catches every one of them, reports it, and leaves
/// the next decode untouched. An unknown set id is not an error at all; it
/// decodes to `FlowRecord::Unsupported`.
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── Truncation
///   │   ├── TruncatedHeader       ← fewer than 16 bytes for the message header
///   │   ├── TruncatedSetHeader    ← fewer than 4 bytes for the set header
///   │   └── TruncatedRecord       ← fewer bytes than the record layout needs
///   └── StructuralViolation
///       ├── Cursor(CursorError)   ← bounds exceeded / duplicate structure
///       ├── StructureLength       ← sFlow sample or element over/under-read
///       ├── UnsupportedVersion    ← sFlow datagram version is not 5
///       ├── UnknownAddressType    ← sFlow agent address type not 1 or 2
///       ├── LengthMismatch        ← strict mode: declared length disagrees
///       └── Type(TypeError)       ← record body rejected by flx-types
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated message header: {available} of 16 bytes")]
    TruncatedHeader { available: usize },

    #[error("truncated set header: {available} of 4 bytes")]
    TruncatedSetHeader { available: usize },

    /// The set id selected a known layout but the datagram ends before the
    /// record does.
    #[error("truncated record for set id {set_id}: need {needed} bytes, {available} available")]
    TruncatedRecord {
        set_id: u16,
        needed: usize,
        available: usize,
    },

    /// A length declared in a header disagrees with the structure that
    /// follows. Only raised under `LengthCheck::Strict`.
    #[error("{structure} length mismatch: declared {declared}, actual {actual}")]
    LengthMismatch {
        structure: &'static str,
        declared: usize,
        actual: usize,
    },

    /// A word cursor read failed. The inner error carries the word offset
    /// and the source location of the failing read.
    #[error(transparent)]
    Cursor(#[from] CursorError),

    /// An sFlow sample or element was not consumed to exactly its declared
    /// byte length. Offsets are in words.
    #[error("{structure} ended at word {actual}, expected word {expected}")]
    StructureLength {
        structure: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported sflow version {version}")]
    UnsupportedVersion { version: u32 },

    #[error("unknown agent address type {value}")]
    UnknownAddressType { value: u32 },

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Coarse classification of a [`DecodeError`], used for counters and log
/// fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The datagram ended before a fixed-size structure did.
    Truncation,
    /// The datagram is long enough but internally inconsistent.
    StructuralViolation,
}

impl ErrorClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Truncation => "truncation",
            Self::StructuralViolation => "structural",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DecodeError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::TruncatedHeader { .. }
            | Self::TruncatedSetHeader { .. }
            | Self::TruncatedRecord { .. } => ErrorClass::Truncation,
            Self::LengthMismatch { .. }
            | Self::Cursor(_)
            | Self::StructureLength { .. }
            | Self::UnsupportedVersion { .. }
            | Self::UnknownAddressType { .. }
            | Self::Type(_) => ErrorClass::StructuralViolation,
        }
    }
}
