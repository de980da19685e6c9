#![warn(clippy::pedantic)]

pub mod boundary;
pub mod config;
pub mod decoder;
pub mod error;
pub mod sflow;

pub use boundary::{Datagram, DecodeStats, Diagnostic, Outcome, decode_datagram};
pub use config::{DecoderConfig, ExportFormat, LengthCheck};
pub use decoder::{IpfixDecoder, IpfixMessage};
pub use error::{DecodeError, ErrorClass};
pub use sflow::SflowDecoder;
