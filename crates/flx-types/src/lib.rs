#![warn(clippy::pedantic)]

pub mod error;
pub mod record_kind;
pub mod ethernet;
pub mod icmp;
pub mod record;
pub mod sflow;

pub use error::TypeError;
pub use ethernet::EthernetRecord;
pub use icmp::IcmpRecord;
pub use record::FlowRecord;
pub use record_kind::RecordKind;
