#![warn(clippy::pedantic)]

pub mod cursor;
pub mod error;
pub mod header;
pub mod pull;

pub use cursor::DecodeCursor;
pub use error::{CursorError, CursorErrorKind, WireError};
pub use header::{MessageHeader, SetHeader};
pub use pull::try_pull;
