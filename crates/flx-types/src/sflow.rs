//! Extended flow records: the sFlow version 5 subset understood by the
//! collector.
//!
//! sFlow is XDR encoded: every scalar is one or two 32-bit big-endian words
//! and opaque data is padded to a word boundary. The structures here are
//! plain data; decoding lives in `flx-decoder` (on top of the word cursor)
//! and encoding in `flx-encoder`.
//!
//! ```text
//! datagram
//! ├── version, agent address, sub agent id, sequence, uptime
//! └── samples (tag + byte length each)
//!     ├── flow sample     → flow elements    (tag + byte length each)
//!     ├── counter sample  → counter elements (tag + byte length each)
//!     └── anything else   → skipped by length
//! ```

use std::net::{IpAddr, Ipv4Addr};

/// The only datagram version decoded.
pub const SFLOW_VERSION: u32 = 5;

/// Agent address type tags.
pub mod address_type {
    pub const IPV4: u32 = 1;
    pub const IPV6: u32 = 2;
}

/// Sample format numbers (enterprise 0).
pub mod sample_format {
    pub const FLOW: u32 = 1;
    pub const COUNTERS: u32 = 2;
}

/// Flow element format numbers (enterprise 0).
pub mod flow_format {
    pub const RAW_HEADER: u32 = 1;
    pub const ETHERNET: u32 = 2;
    pub const IPV4: u32 = 3;
    pub const EXTENDED_SWITCH: u32 = 1001;
}

/// Counter element format numbers (enterprise 0).
pub mod counter_format {
    pub const GENERIC_INTERFACE: u32 = 1;
    pub const HOST_DESCRIPTION: u32 = 2000;
}

/// Split a data-format tag into `(enterprise, format)`.
pub fn split_tag(tag: u32) -> (u32, u32) {
    (tag >> 12, tag & 0x0FFF)
}

/// Build a data-format tag from an enterprise and a format number.
pub fn make_tag(enterprise: u32, format: u32) -> u32 {
    (enterprise << 12) | (format & 0x0FFF)
}

/// One decoded sFlow datagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SflowDatagram {
    pub version: u32,
    pub agent: IpAddr,
    pub sub_agent_id: u32,
    pub sequence: u32,
    pub uptime_ms: u32,
    pub samples: Vec<SflowSample>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SflowSample {
    Flow(FlowSample),
    Counters(CounterSample),
    /// A sample whose tag is not understood; skipped by its declared length.
    Unsupported { tag: u32, length: u32 },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowSample {
    pub sequence: u32,
    /// Source type in the top 8 bits, source index in the low 24.
    pub source_id: u32,
    pub sampling_rate: u32,
    pub sample_pool: u32,
    pub drops: u32,
    pub input: u32,
    pub output: u32,
    pub elements: Vec<FlowElement>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowElement {
    RawHeader(RawPacketHeader),
    Ethernet(EthernetFrame),
    Ipv4(Ipv4Flow),
    ExtendedSwitch(ExtendedSwitch),
    Unsupported { tag: u32, length: u32 },
}

/// Sampled packet header bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawPacketHeader {
    pub protocol: u32,
    pub frame_length: u32,
    pub stripped: u32,
    pub header: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EthernetFrame {
    pub length: u32,
    pub src_mac: [u8; 6],
    pub dst_mac: [u8; 6],
    pub eth_type: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ipv4Flow {
    pub length: u32,
    pub protocol: u32,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
    pub src_port: u32,
    pub dst_port: u32,
    pub tcp_flags: u32,
    pub tos: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtendedSwitch {
    pub src_vlan: u32,
    pub src_priority: u32,
    pub dst_vlan: u32,
    pub dst_priority: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterSample {
    pub sequence: u32,
    pub source_id: u32,
    pub elements: Vec<CounterElement>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CounterElement {
    GenericInterface(InterfaceCounters),
    HostDescription(HostDescription),
    Unsupported { tag: u32, length: u32 },
}

/// Generic interface counters (88 bytes on the wire).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub if_index: u32,
    pub if_type: u32,
    pub if_speed: u64,
    pub if_direction: u32,
    pub if_status: u32,
    pub in_octets: u64,
    pub in_ucast_pkts: u32,
    pub in_multicast_pkts: u32,
    pub in_broadcast_pkts: u32,
    pub in_discards: u32,
    pub in_errors: u32,
    pub in_unknown_protos: u32,
    pub out_octets: u64,
    pub out_ucast_pkts: u32,
    pub out_multicast_pkts: u32,
    pub out_broadcast_pkts: u32,
    pub out_discards: u32,
    pub out_errors: u32,
    pub promiscuous_mode: u32,
}

impl InterfaceCounters {
    /// Wire length in 32-bit words.
    pub const WORDS: usize = 22;
}

/// Host description counters. Strings are decoded lossily as UTF-8.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostDescription {
    pub hostname: String,
    pub uuid: [u8; 16],
    pub machine_type: u32,
    pub os_name: u32,
    pub os_release: String,
}
