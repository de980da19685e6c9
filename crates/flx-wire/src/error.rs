use std::fmt;
use std::panic::Location;

/// Errors raised while reading fixed-size wire structures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Fewer bytes remained than the structure occupies.
    #[error("truncated {structure}: need {needed} bytes, {available} available")]
    Truncated {
        structure: &'static str,
        needed: usize,
        available: usize,
    },
}

/// The two structural failures a [`DecodeCursor`](crate::DecodeCursor) can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorErrorKind {
    /// A read would have moved past the last whole word of the buffer.
    BoundsExceeded,
    /// A once-only structure marker was set a second time.
    DuplicateStructure,
}

impl fmt::Display for CursorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoundsExceeded => f.write_str("bounds exceeded"),
            Self::DuplicateStructure => f.write_str("duplicate structure"),
        }
    }
}

/// A structural failure raised by the word cursor.
///
/// Besides the word offset at which the cursor stood, the error carries the
/// source location of the cursor call that failed. Cursor methods are
/// `#[track_caller]`, so the location points into the decoder that issued
/// the read, not into the cursor itself.
///
/// ```text
/// bounds exceeded at word 7 of 6 (crates/flx-decoder/src/sflow.rs:212:31)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at word {offset} of {capacity} ({location})")]
pub struct CursorError {
    pub kind: CursorErrorKind,
    /// Word offset of the cursor when the failure was raised.
    pub offset: usize,
    /// Word capacity of the buffer.
    pub capacity: usize,
    pub location: &'static Location<'static>,
}

impl CursorError {
    #[must_use]
    pub fn is_bounds(&self) -> bool {
        self.kind == CursorErrorKind::BoundsExceeded
    }

    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.kind == CursorErrorKind::DuplicateStructure
    }
}
