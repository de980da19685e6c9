//! Conformance tests: hand-written golden datagrams decoded and rendered to
//! inline insta snapshots.
//!
//! The fixtures in `tests/golden/*.hex` are byte-exact wire images written
//! independently of the encoder, so these tests pin the wire layout rather
//! than the encoder's idea of it.

use flx_decoder::{Datagram, DecodeStats, DecoderConfig, Outcome, decode_datagram};
use flx_encoder::IpfixEncoder;
use flx_tests::{golden, reference_ethernet};
use flx_types::FlowRecord;
use insta::assert_snapshot;

fn decoded(name: &str) -> Datagram {
    match decode_datagram(&golden(name), &DecoderConfig::auto()) {
        Outcome::Decoded(datagram) => datagram,
        Outcome::Dropped(diagnostic) => panic!("{name}: {diagnostic}"),
    }
}

#[test]
fn ipfix_ethernet_fixture() {
    let Datagram::Ipfix(message) = decoded("ipfix_ethernet.hex") else {
        panic!("expected an ipfix message");
    };
    assert_snapshot!(message.header, @"header: v10, length 40, export time 0, seq 1, observation domain 7");
    assert_snapshot!(message.set, @"set: id 256, length 45");
    assert_eq!(message.record, FlowRecord::Ethernet(reference_ethernet()));
}

#[test]
fn encoder_matches_fixture_body() {
    let fixture = golden("ipfix_ethernet.hex");
    let encoded = IpfixEncoder::new()
        .sequence(1)
        .observation_domain(7)
        .declared_lengths(40, 45)
        .record(FlowRecord::Ethernet(reference_ethernet()))
        .encode()
        .unwrap();
    assert_eq!(encoded, fixture);
}

#[test]
fn truncated_fixture_diagnostic() {
    let bytes = golden("ipfix_truncated_record.hex");
    let Outcome::Dropped(diagnostic) = decode_datagram(&bytes, &DecoderConfig::default()) else {
        panic!("truncated record must be dropped");
    };
    assert_snapshot!(
        diagnostic,
        @"dropped 31 byte datagram (truncation): truncated record for set id 256: need 45 bytes, 11 available"
    );
}

#[test]
fn sflow_empty_fixture() {
    let Datagram::Sflow(datagram) = decoded("sflow_empty.hex") else {
        panic!("expected an sflow datagram");
    };
    assert_eq!(datagram.agent.to_string(), "192.0.2.1");
    assert_eq!(datagram.sequence, 9);
    assert_eq!(datagram.uptime_ms, 1234);
    assert!(datagram.samples.is_empty());
}

#[test]
fn stats_summary() {
    let mut stats = DecodeStats::default();
    for name in ["ipfix_ethernet.hex", "ipfix_truncated_record.hex", "sflow_empty.hex"] {
        stats.record(&decode_datagram(&golden(name), &DecoderConfig::auto()));
    }
    assert_snapshot!(stats, @"3 datagrams: 2 decoded (0 unsupported), 1 truncated, 0 structural");
}
