/// Implementation of `flx sample`.
///
/// Writes a ready-made datagram produced by the encoder crate. Useful for
/// feeding `flx decode`, or `flx listen` through something like
/// `nc -u 127.0.0.1 4739 < sample.bin`.
use std::fs;
use std::net::{IpAddr, Ipv4Addr};

use anyhow::{Context, Result};
use flx_encoder::{IpfixEncoder, SflowEncoder};
use flx_types::sflow::{
    CounterElement, CounterSample, EthernetFrame, ExtendedSwitch, FlowElement, FlowSample,
    HostDescription, InterfaceCounters, Ipv4Flow, SFLOW_VERSION, SflowDatagram, SflowSample,
};
use flx_types::{EthernetRecord, FlowRecord, IcmpRecord};

use crate::{SampleArgs, SampleKind};

/// Run the `flx sample` command.
///
/// # Errors
///
/// Returns an error if encoding fails or the output file cannot be written.
pub fn run(args: &SampleArgs) -> Result<()> {
    let bytes = build(args.kind)?;
    let contents = if args.hex {
        let mut text = hex::encode(&bytes);
        text.push('\n');
        text.into_bytes()
    } else {
        bytes
    };

    fs::write(&args.output, &contents)
        .with_context(|| format!("cannot write {}", args.output.display()))?;

    tracing::info!(
        kind = ?args.kind,
        bytes = contents.len(),
        path = %args.output.display(),
        "wrote sample datagram"
    );
    Ok(())
}

/// Encode the sample datagram for `kind`.
pub fn build(kind: SampleKind) -> Result<Vec<u8>> {
    let bytes = match kind {
        SampleKind::Ethernet => IpfixEncoder::new()
            .sequence(1)
            .observation_domain(7)
            .record(FlowRecord::Ethernet(EthernetRecord {
                obs_point_id: 42,
                src_mac: [0x00, 0x01, 0x02, 0x03, 0x04, 0x05],
                dst_mac: [0x52, 0x54, 0x00, 0xab, 0xcd, 0xef],
                eth_type: 0x0800,
                eth_hdlen: 14,
                start_time: 1_700_000_000,
                end_time: 1_700_000_060,
                packets: 100,
                octet_delta_count: 6400,
                flow_end_reason: 2,
                ..EthernetRecord::default()
            }))
            .encode()?,
        SampleKind::Icmp => IpfixEncoder::new()
            .sequence(2)
            .observation_domain(7)
            .record(FlowRecord::Icmp(IcmpRecord {
                obs_point_id: 42,
                eth_type: 0x0800,
                eth_hdlen: 14,
                ip_version: 4,
                ip_ttl: 64,
                ip_proto: 1,
                src_ip: [10, 0, 0, 1],
                dst_ip: [10, 0, 0, 2],
                icmp_type: 8,
                packets: 4,
                octet_delta_count: 336,
                octets: 336,
                min_len: 84,
                max_len: 84,
                ..IcmpRecord::default()
            }))
            .encode()?,
        SampleKind::Unsupported => IpfixEncoder::new()
            .sequence(3)
            .raw_set(300, &[0u8; 8])
            .encode()?,
        SampleKind::Sflow => SflowEncoder::encode(&sflow_sample())?,
    };
    Ok(bytes)
}

fn sflow_sample() -> SflowDatagram {
    SflowDatagram {
        version: SFLOW_VERSION,
        agent: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
        sub_agent_id: 0,
        sequence: 1,
        uptime_ms: 60_000,
        samples: vec![
            SflowSample::Flow(FlowSample {
                sequence: 1,
                source_id: 4,
                sampling_rate: 1000,
                sample_pool: 1000,
                input: 4,
                output: 7,
                elements: vec![
                    FlowElement::Ethernet(EthernetFrame {
                        length: 64,
                        src_mac: [0x00, 0x01, 0x02, 0x03, 0x04, 0x05],
                        dst_mac: [0x52, 0x54, 0x00, 0xab, 0xcd, 0xef],
                        eth_type: 0x0800,
                    }),
                    FlowElement::Ipv4(Ipv4Flow {
                        length: 50,
                        protocol: 6,
                        src_ip: Ipv4Addr::new(10, 0, 0, 1),
                        dst_ip: Ipv4Addr::new(10, 0, 0, 2),
                        src_port: 40_000,
                        dst_port: 443,
                        tcp_flags: 0x18,
                        tos: 0,
                    }),
                    FlowElement::ExtendedSwitch(ExtendedSwitch {
                        src_vlan: 10,
                        dst_vlan: 10,
                        ..ExtendedSwitch::default()
                    }),
                ],
                ..FlowSample::default()
            }),
            SflowSample::Counters(CounterSample {
                sequence: 1,
                source_id: 4,
                elements: vec![
                    CounterElement::GenericInterface(InterfaceCounters {
                        if_index: 4,
                        if_type: 6,
                        if_speed: 1_000_000_000,
                        if_direction: 1,
                        if_status: 3,
                        in_octets: 123_456_789,
                        in_ucast_pkts: 1000,
                        out_octets: 987_654_321,
                        out_ucast_pkts: 2000,
                        ..InterfaceCounters::default()
                    }),
                    CounterElement::HostDescription(HostDescription {
                        hostname: "edge-sw1".into(),
                        uuid: [0x11; 16],
                        machine_type: 3,
                        os_name: 2,
                        os_release: "6.1.0".into(),
                    }),
                ],
            }),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flx_decoder::{Datagram, DecoderConfig, LengthCheck, Outcome, decode_datagram};

    #[test]
    fn every_sample_decodes_strictly() {
        let config = DecoderConfig {
            length_check: LengthCheck::Strict,
            ..DecoderConfig::auto()
        };
        for kind in [
            SampleKind::Ethernet,
            SampleKind::Icmp,
            SampleKind::Unsupported,
            SampleKind::Sflow,
        ] {
            let bytes = build(kind).unwrap();
            assert!(
                matches!(decode_datagram(&bytes, &config), Outcome::Decoded(_)),
                "{kind:?} sample must decode"
            );
        }
    }

    #[test]
    fn sflow_sample_roundtrips() {
        let bytes = build(SampleKind::Sflow).unwrap();
        let Outcome::Decoded(Datagram::Sflow(decoded)) =
            decode_datagram(&bytes, &DecoderConfig::auto())
        else {
            panic!("expected sflow datagram");
        };
        assert_eq!(decoded, sflow_sample());
    }
}
