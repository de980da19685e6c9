//! Shared fixtures for the integration suites and benches.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use flx_encoder::{IpfixEncoder, SflowEncoder};
use flx_types::sflow::{
    CounterElement, CounterSample, EthernetFrame, ExtendedSwitch, FlowElement, FlowSample,
    InterfaceCounters, Ipv4Flow, RawPacketHeader, SFLOW_VERSION, SflowDatagram, SflowSample,
};
use flx_types::{EthernetRecord, FlowRecord, IcmpRecord};

/// Read a hex fixture from `tests/golden/`. Whitespace is ignored.
///
/// # Panics
///
/// If the file is missing or is not valid hex.
#[must_use]
pub fn golden(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden")
        .join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read golden fixture {}: {e}", path.display()));
    let digits: String = text.split_whitespace().collect();
    hex::decode(digits)
        .unwrap_or_else(|e| panic!("invalid hex in golden fixture {}: {e}", path.display()))
}

/// The reference ethernet record: `obs_point_id=42, packets=100,
/// src_mac=00:01:02:03:04:05`, everything else zero.
#[must_use]
pub fn reference_ethernet() -> EthernetRecord {
    EthernetRecord {
        obs_point_id: 42,
        packets: 100,
        src_mac: [0, 1, 2, 3, 4, 5],
        ..EthernetRecord::default()
    }
}

/// An ethernet record with every field set to a distinct value.
#[must_use]
pub fn full_ethernet() -> EthernetRecord {
    EthernetRecord {
        obs_point_id: 0x0102_0304,
        direction: 1,
        src_mac: [0xde, 0xad, 0xbe, 0xef, 0x00, 0x01],
        dst_mac: [0x52, 0x54, 0x00, 0x12, 0x34, 0x56],
        eth_type: 0x86dd,
        eth_hdlen: 14,
        start_time: 1_700_000_000,
        end_time: 1_700_000_042,
        packets: 0x0000_0001_0000_0002,
        octet_delta_count: u64::MAX - 1,
        flow_end_reason: 3,
    }
}

/// An ICMP record with every field set to a distinct value.
#[must_use]
pub fn full_icmp() -> IcmpRecord {
    IcmpRecord {
        obs_point_id: 7,
        direction: 0,
        src_mac: [1, 2, 3, 4, 5, 6],
        dst_mac: [6, 5, 4, 3, 2, 1],
        eth_type: 0x0800,
        eth_hdlen: 14,
        ip_version: 4,
        ip_ttl: 63,
        ip_proto: 1,
        dscp: 46,
        ip_precedence: 5,
        ip_tos: 0xb8,
        src_ip: [192, 168, 1, 10],
        dst_ip: [8, 8, 8, 8],
        icmp_type: 0,
        icmp_code: 0,
        start_time: 10,
        end_time: 20,
        packets: 3,
        octet_delta_count: 252,
        flow_end_reason: 1,
        octets: 252,
        delta_octets_squared: 21_168,
        min_len: 84,
        max_len: 84,
    }
}

/// Encode `record` as a single-set IPFIX datagram with sequence 1 and
/// observation domain 7.
///
/// # Panics
///
/// Never for the fixed-size records used here.
#[must_use]
pub fn ipfix_datagram(record: FlowRecord) -> Vec<u8> {
    IpfixEncoder::new()
        .sequence(1)
        .observation_domain(7)
        .record(record)
        .encode()
        .expect("fixture records always encode")
}

/// A datagram with one sample of each kind and every known element.
#[must_use]
pub fn full_sflow() -> SflowDatagram {
    SflowDatagram {
        version: SFLOW_VERSION,
        agent: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
        sub_agent_id: 3,
        sequence: 1234,
        uptime_ms: 86_400_000,
        samples: vec![
            SflowSample::Flow(FlowSample {
                sequence: 10,
                source_id: 4,
                sampling_rate: 2048,
                sample_pool: 4096,
                drops: 1,
                input: 4,
                output: 9,
                elements: vec![
                    FlowElement::RawHeader(RawPacketHeader {
                        protocol: 1,
                        frame_length: 1518,
                        stripped: 4,
                        header: (0u8..=127).collect(),
                    }),
                    FlowElement::Ethernet(EthernetFrame {
                        length: 1514,
                        src_mac: [0, 1, 2, 3, 4, 5],
                        dst_mac: [6, 7, 8, 9, 10, 11],
                        eth_type: 0x0800,
                    }),
                    FlowElement::Ipv4(Ipv4Flow {
                        length: 1500,
                        protocol: 17,
                        src_ip: Ipv4Addr::new(10, 1, 1, 1),
                        dst_ip: Ipv4Addr::new(10, 2, 2, 2),
                        src_port: 53,
                        dst_port: 33_000,
                        tcp_flags: 0,
                        tos: 0,
                    }),
                    FlowElement::ExtendedSwitch(ExtendedSwitch {
                        src_vlan: 100,
                        src_priority: 1,
                        dst_vlan: 200,
                        dst_priority: 2,
                    }),
                ],
            }),
            SflowSample::Counters(CounterSample {
                sequence: 11,
                source_id: 4,
                elements: vec![CounterElement::GenericInterface(InterfaceCounters {
                    if_index: 4,
                    if_type: 6,
                    if_speed: 25_000_000_000,
                    if_direction: 1,
                    if_status: 3,
                    in_octets: 1 << 40,
                    out_octets: (1 << 40) + 1,
                    ..InterfaceCounters::default()
                })],
            }),
        ],
    }
}

/// Encode [`full_sflow`].
///
/// # Panics
///
/// Never; the fixture fits every length field.
#[must_use]
pub fn sflow_datagram() -> Vec<u8> {
    SflowEncoder::encode(&full_sflow()).expect("fixture datagram always encodes")
}
