#![warn(clippy::pedantic)]

pub mod error;
pub mod encoder;
pub mod sflow;
pub mod xdr;

pub use encoder::IpfixEncoder;
pub use error::EncodeError;
pub use sflow::SflowEncoder;
pub use xdr::XdrWriter;
