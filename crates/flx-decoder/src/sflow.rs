use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use flx_types::sflow::{
    CounterElement, CounterSample, EthernetFrame, ExtendedSwitch, FlowElement, FlowSample,
    HostDescription, InterfaceCounters, Ipv4Flow, RawPacketHeader, SFLOW_VERSION, SflowDatagram,
    SflowSample, address_type, counter_format, flow_format, sample_format, split_tag,
};
use flx_wire::cursor::WORD_SIZE;
use flx_wire::{CursorError, DecodeCursor};
use tracing::{debug, trace};

use crate::error::DecodeError;

/// sFlow version 5 decoder, built entirely on [`DecodeCursor`].
///
/// Every sample and element is framed by a tag and a byte length. The
/// decoder marks where the frame must end, decodes the known layout, then
/// checks that it landed exactly on the mark:
///
/// ```text
///   tag | length | body .............. |
///                ^                      ^
///                start                  end = mark(length / 4)
///                                       mark_ok(end) or StructureLength
/// ```
///
/// Unknown sample and element formats are skipped by length and kept as
/// `Unsupported` entries. Each known element format may appear at most once
/// per sample (`DuplicateStructure` otherwise).
pub struct SflowDecoder;

impl SflowDecoder {
    /// Decode one datagram.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UnsupportedVersion`] if the version word is not 5.
    /// - [`DecodeError::UnknownAddressType`] for an agent address type other
    ///   than IPv4 or IPv6.
    /// - [`DecodeError::Cursor`] when a read runs past the last whole word
    ///   or a known element repeats within a sample.
    /// - [`DecodeError::StructureLength`] when a sample or element body is
    ///   not exactly its declared length.
    pub fn decode(datagram: &[u8]) -> Result<SflowDatagram, DecodeError> {
        let mut cursor = DecodeCursor::new(datagram);

        let version = cursor.next()?;
        if version != SFLOW_VERSION {
            return Err(DecodeError::UnsupportedVersion { version });
        }
        let agent = read_agent(&mut cursor)?;
        let sub_agent_id = cursor.next()?;
        let sequence = cursor.next()?;
        let uptime_ms = cursor.next()?;
        let num_samples = cursor.next()?;

        // Every sample consumes at least two words, so the loop is bounded
        // by the buffer even when the count is not.
        let mut samples = Vec::new();
        for _ in 0..num_samples {
            samples.push(read_sample(&mut cursor)?);
        }

        trace!(
            %agent,
            sequence,
            samples = samples.len(),
            "decoded sflow datagram"
        );

        Ok(SflowDatagram {
            version,
            agent,
            sub_agent_id,
            sequence,
            uptime_ms,
            samples,
        })
    }
}

fn read_agent(cursor: &mut DecodeCursor<'_>) -> Result<IpAddr, DecodeError> {
    match cursor.next()? {
        address_type::IPV4 => Ok(IpAddr::V4(read_ipv4(cursor)?)),
        address_type::IPV6 => {
            let mut octets = [0u8; 16];
            for chunk in octets.chunks_exact_mut(WORD_SIZE) {
                chunk.copy_from_slice(&cursor.next_raw()?.to_ne_bytes());
            }
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        value => Err(DecodeError::UnknownAddressType { value }),
    }
}

#[track_caller]
fn read_ipv4(cursor: &mut DecodeCursor<'_>) -> Result<Ipv4Addr, CursorError> {
    Ok(Ipv4Addr::from(cursor.next_raw()?.to_ne_bytes()))
}

fn read_sample(cursor: &mut DecodeCursor<'_>) -> Result<SflowSample, DecodeError> {
    let tag = cursor.next()?;
    let length = cursor.next()?;
    let end = cursor.mark(words(length));

    let sample = match split_tag(tag) {
        (0, sample_format::FLOW) => SflowSample::Flow(read_flow_sample(cursor)?),
        (0, sample_format::COUNTERS) => SflowSample::Counters(read_counter_sample(cursor)?),
        (enterprise, format) => {
            debug!(enterprise, format, length, "skipping unsupported sflow sample");
            skip_bytes(cursor, length)?;
            SflowSample::Unsupported { tag, length }
        }
    };

    expect_end(cursor, end, "sample")?;
    Ok(sample)
}

/// Once-only offsets of the known flow element formats within one sample.
#[derive(Default)]
struct FlowSeen {
    raw_header: Option<usize>,
    ethernet: Option<usize>,
    ipv4: Option<usize>,
    extended_switch: Option<usize>,
}

fn read_flow_sample(cursor: &mut DecodeCursor<'_>) -> Result<FlowSample, DecodeError> {
    let sequence = cursor.next()?;
    let source_id = cursor.next()?;
    let sampling_rate = cursor.next()?;
    let sample_pool = cursor.next()?;
    let drops = cursor.next()?;
    let input = cursor.next()?;
    let output = cursor.next()?;
    let count = cursor.next()?;

    let mut seen = FlowSeen::default();
    let mut elements = Vec::new();
    for _ in 0..count {
        elements.push(read_flow_element(cursor, &mut seen)?);
    }

    Ok(FlowSample {
        sequence,
        source_id,
        sampling_rate,
        sample_pool,
        drops,
        input,
        output,
        elements,
    })
}

fn read_flow_element(
    cursor: &mut DecodeCursor<'_>,
    seen: &mut FlowSeen,
) -> Result<FlowElement, DecodeError> {
    let tag = cursor.next()?;
    let length = cursor.next()?;
    let end = cursor.mark(words(length));

    let element = match split_tag(tag) {
        (0, flow_format::RAW_HEADER) => {
            cursor.mark_unique(&mut seen.raw_header)?;
            let protocol = cursor.next()?;
            let frame_length = cursor.next()?;
            let stripped = cursor.next()?;
            let header = read_opaque(cursor)?.to_vec();
            FlowElement::RawHeader(RawPacketHeader {
                protocol,
                frame_length,
                stripped,
                header,
            })
        }
        (0, flow_format::ETHERNET) => {
            cursor.mark_unique(&mut seen.ethernet)?;
            FlowElement::Ethernet(EthernetFrame {
                length: cursor.next()?,
                src_mac: read_fixed(cursor)?,
                dst_mac: read_fixed(cursor)?,
                eth_type: cursor.next()?,
            })
        }
        (0, flow_format::IPV4) => {
            cursor.mark_unique(&mut seen.ipv4)?;
            FlowElement::Ipv4(Ipv4Flow {
                length: cursor.next()?,
                protocol: cursor.next()?,
                src_ip: read_ipv4(cursor)?,
                dst_ip: read_ipv4(cursor)?,
                src_port: cursor.next()?,
                dst_port: cursor.next()?,
                tcp_flags: cursor.next()?,
                tos: cursor.next()?,
            })
        }
        (0, flow_format::EXTENDED_SWITCH) => {
            cursor.mark_unique(&mut seen.extended_switch)?;
            FlowElement::ExtendedSwitch(ExtendedSwitch {
                src_vlan: cursor.next()?,
                src_priority: cursor.next()?,
                dst_vlan: cursor.next()?,
                dst_priority: cursor.next()?,
            })
        }
        (enterprise, format) => {
            debug!(enterprise, format, length, "skipping unsupported flow element");
            skip_bytes(cursor, length)?;
            FlowElement::Unsupported { tag, length }
        }
    };

    expect_end(cursor, end, "flow element")?;
    Ok(element)
}

#[derive(Default)]
struct CounterSeen {
    generic_interface: Option<usize>,
    host_description: Option<usize>,
}

fn read_counter_sample(cursor: &mut DecodeCursor<'_>) -> Result<CounterSample, DecodeError> {
    let sequence = cursor.next()?;
    let source_id = cursor.next()?;
    let count = cursor.next()?;

    let mut seen = CounterSeen::default();
    let mut elements = Vec::new();
    for _ in 0..count {
        elements.push(read_counter_element(cursor, &mut seen)?);
    }

    Ok(CounterSample {
        sequence,
        source_id,
        elements,
    })
}

fn read_counter_element(
    cursor: &mut DecodeCursor<'_>,
    seen: &mut CounterSeen,
) -> Result<CounterElement, DecodeError> {
    let tag = cursor.next()?;
    let length = cursor.next()?;
    let end = cursor.mark(words(length));

    let element = match split_tag(tag) {
        (0, counter_format::GENERIC_INTERFACE) => {
            cursor.mark_unique(&mut seen.generic_interface)?;
            CounterElement::GenericInterface(read_interface_counters(cursor)?)
        }
        (0, counter_format::HOST_DESCRIPTION) => {
            cursor.mark_unique(&mut seen.host_description)?;
            CounterElement::HostDescription(HostDescription {
                hostname: read_string(cursor)?,
                uuid: read_fixed(cursor)?,
                machine_type: cursor.next()?,
                os_name: cursor.next()?,
                os_release: read_string(cursor)?,
            })
        }
        (enterprise, format) => {
            debug!(enterprise, format, length, "skipping unsupported counter element");
            skip_bytes(cursor, length)?;
            CounterElement::Unsupported { tag, length }
        }
    };

    expect_end(cursor, end, "counter element")?;
    Ok(element)
}

fn read_interface_counters(cursor: &mut DecodeCursor<'_>) -> Result<InterfaceCounters, CursorError> {
    Ok(InterfaceCounters {
        if_index: cursor.next()?,
        if_type: cursor.next()?,
        if_speed: cursor.next_64()?,
        if_direction: cursor.next()?,
        if_status: cursor.next()?,
        in_octets: cursor.next_64()?,
        in_ucast_pkts: cursor.next()?,
        in_multicast_pkts: cursor.next()?,
        in_broadcast_pkts: cursor.next()?,
        in_discards: cursor.next()?,
        in_errors: cursor.next()?,
        in_unknown_protos: cursor.next()?,
        out_octets: cursor.next_64()?,
        out_ucast_pkts: cursor.next()?,
        out_multicast_pkts: cursor.next()?,
        out_broadcast_pkts: cursor.next()?,
        out_discards: cursor.next()?,
        out_errors: cursor.next()?,
        promiscuous_mode: cursor.next()?,
    })
}

/// Take `len` bytes from the cursor and skip the padding after them.
#[track_caller]
fn take_bytes<'a>(cursor: &mut DecodeCursor<'a>, len: usize) -> Result<&'a [u8], CursorError> {
    let view = cursor.string_at_cursor()?;
    cursor.skip(len.div_ceil(WORD_SIZE));
    // fails if the skip ran past the last word
    cursor.string_at_cursor()?;
    Ok(&view[..len])
}

/// A length-prefixed opaque field.
#[track_caller]
fn read_opaque<'a>(cursor: &mut DecodeCursor<'a>) -> Result<&'a [u8], CursorError> {
    let len = cursor.next()? as usize;
    take_bytes(cursor, len)
}

#[track_caller]
fn read_string(cursor: &mut DecodeCursor<'_>) -> Result<String, CursorError> {
    Ok(String::from_utf8_lossy(read_opaque(cursor)?).into_owned())
}

/// A fixed-size opaque field such as a MAC address or a UUID.
#[track_caller]
fn read_fixed<const N: usize>(cursor: &mut DecodeCursor<'_>) -> Result<[u8; N], CursorError> {
    let mut out = [0u8; N];
    out.copy_from_slice(take_bytes(cursor, N)?);
    Ok(out)
}

#[track_caller]
fn skip_bytes(cursor: &mut DecodeCursor<'_>, length: u32) -> Result<(), CursorError> {
    cursor.skip(words(length));
    cursor.string_at_cursor().map(|_| ())
}

fn words(length: u32) -> usize {
    length as usize / WORD_SIZE
}

fn expect_end(
    cursor: &DecodeCursor<'_>,
    end: usize,
    structure: &'static str,
) -> Result<(), DecodeError> {
    if cursor.mark_ok(end) {
        Ok(())
    } else {
        Err(DecodeError::StructureLength {
            structure,
            expected: end,
            actual: cursor.offset(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flx_encoder::SflowEncoder;
    use flx_types::sflow::make_tag;

    fn datagram(samples: Vec<SflowSample>) -> SflowDatagram {
        SflowDatagram {
            version: SFLOW_VERSION,
            agent: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
            sub_agent_id: 1,
            sequence: 77,
            uptime_ms: 60_000,
            samples,
        }
    }

    fn switch_sample() -> SflowSample {
        SflowSample::Flow(FlowSample {
            sequence: 1,
            sampling_rate: 512,
            elements: vec![FlowElement::ExtendedSwitch(ExtendedSwitch {
                src_vlan: 10,
                dst_vlan: 20,
                ..ExtendedSwitch::default()
            })],
            ..FlowSample::default()
        })
    }

    #[test]
    fn decodes_flow_and_counter_samples() {
        let original = datagram(vec![
            SflowSample::Flow(FlowSample {
                sequence: 3,
                source_id: 0x0000_0004,
                sampling_rate: 1000,
                sample_pool: 4000,
                drops: 0,
                input: 4,
                output: 7,
                elements: vec![
                    FlowElement::RawHeader(RawPacketHeader {
                        protocol: 1,
                        frame_length: 64,
                        stripped: 4,
                        header: vec![0xAA; 14],
                    }),
                    FlowElement::Ethernet(EthernetFrame {
                        length: 64,
                        src_mac: [0, 1, 2, 3, 4, 5],
                        dst_mac: [6, 7, 8, 9, 10, 11],
                        eth_type: 0x0800,
                    }),
                    FlowElement::Ipv4(Ipv4Flow {
                        length: 46,
                        protocol: 6,
                        src_ip: Ipv4Addr::new(10, 0, 0, 1),
                        dst_ip: Ipv4Addr::new(10, 0, 0, 2),
                        src_port: 40000,
                        dst_port: 443,
                        tcp_flags: 0x18,
                        tos: 0,
                    }),
                ],
            }),
            SflowSample::Counters(CounterSample {
                sequence: 9,
                source_id: 4,
                elements: vec![
                    CounterElement::GenericInterface(InterfaceCounters {
                        if_index: 4,
                        if_speed: 10_000_000_000,
                        in_octets: 0x1_0000_0001,
                        out_octets: 5,
                        ..InterfaceCounters::default()
                    }),
                    CounterElement::HostDescription(HostDescription {
                        hostname: "edge-sw1".into(),
                        uuid: [7; 16],
                        machine_type: 3,
                        os_name: 2,
                        os_release: "5.10".into(),
                    }),
                ],
            }),
        ]);

        let bytes = SflowEncoder::encode(&original).unwrap();
        assert_eq!(SflowDecoder::decode(&bytes).unwrap(), original);
    }

    #[test]
    fn ipv6_agent() {
        let mut original = datagram(vec![]);
        original.agent = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1));
        let bytes = SflowEncoder::encode(&original).unwrap();
        assert_eq!(SflowDecoder::decode(&bytes).unwrap().agent, original.agent);
    }

    #[test]
    fn unsupported_sample_is_skipped() {
        let original = datagram(vec![
            SflowSample::Unsupported {
                tag: make_tag(0, 4),
                length: 8,
            },
            switch_sample(),
        ]);
        let bytes = SflowEncoder::encode(&original).unwrap();
        assert_eq!(SflowDecoder::decode(&bytes).unwrap(), original);
    }

    #[test]
    fn wrong_version() {
        let mut bytes = SflowEncoder::encode(&datagram(vec![])).unwrap();
        bytes[3] = 4;
        assert_eq!(
            SflowDecoder::decode(&bytes).unwrap_err(),
            DecodeError::UnsupportedVersion { version: 4 }
        );
    }

    #[test]
    fn unknown_address_type() {
        let mut bytes = SflowEncoder::encode(&datagram(vec![])).unwrap();
        bytes[7] = 3;
        assert_eq!(
            SflowDecoder::decode(&bytes).unwrap_err(),
            DecodeError::UnknownAddressType { value: 3 }
        );
    }

    #[test]
    fn duplicate_element_is_structural() {
        let sample = SflowSample::Flow(FlowSample {
            elements: vec![
                FlowElement::ExtendedSwitch(ExtendedSwitch::default()),
                FlowElement::ExtendedSwitch(ExtendedSwitch::default()),
            ],
            ..FlowSample::default()
        });
        let bytes = SflowEncoder::encode(&datagram(vec![sample])).unwrap();
        let DecodeError::Cursor(err) = SflowDecoder::decode(&bytes).unwrap_err() else {
            panic!("expected cursor error");
        };
        assert!(err.is_duplicate());
        assert!(err.location.file().ends_with("sflow.rs"));
    }

    #[test]
    fn element_length_disagreement() {
        let mut bytes = SflowEncoder::encode(&datagram(vec![switch_sample()])).unwrap();
        // element length field: 28 header + 8 sample frame + 32 sample fields + 4 tag
        assert_eq!(&bytes[72..76], &16u32.to_be_bytes());
        bytes[72..76].copy_from_slice(&12u32.to_be_bytes());
        assert!(matches!(
            SflowDecoder::decode(&bytes).unwrap_err(),
            DecodeError::StructureLength {
                structure: "flow element",
                ..
            }
        ));
    }

    #[test]
    fn truncated_datagram_exceeds_bounds() {
        let bytes = SflowEncoder::encode(&datagram(vec![switch_sample()])).unwrap();
        for len in [0, 3, 27, 40, bytes.len() - 1] {
            let DecodeError::Cursor(err) = SflowDecoder::decode(&bytes[..len]).unwrap_err() else {
                panic!("expected cursor error at length {len}");
            };
            assert!(err.is_bounds());
        }
    }

    #[test]
    fn skip_past_end_is_caught() {
        let mut bytes = SflowEncoder::encode(&datagram(vec![SflowSample::Unsupported {
            tag: make_tag(0, 4),
            length: 8,
        }]))
        .unwrap();
        // claim a longer body than the datagram holds
        bytes[32..36].copy_from_slice(&64u32.to_be_bytes());
        let DecodeError::Cursor(err) = SflowDecoder::decode(&bytes).unwrap_err() else {
            panic!("expected cursor error");
        };
        assert!(err.is_bounds());
    }

    #[test]
    fn oversized_string_length_is_caught() {
        let sample = SflowSample::Counters(CounterSample {
            elements: vec![CounterElement::HostDescription(HostDescription::default())],
            ..CounterSample::default()
        });
        let mut bytes = SflowEncoder::encode(&datagram(vec![sample])).unwrap();
        // hostname length: 28 header + 8 sample frame + 12 sample fields + 8 element frame
        let at = 56;
        assert_eq!(&bytes[at..at + 4], &0u32.to_be_bytes());
        bytes[at..at + 4].copy_from_slice(&u32::MAX.to_be_bytes());
        let DecodeError::Cursor(err) = SflowDecoder::decode(&bytes).unwrap_err() else {
            panic!("expected cursor error");
        };
        assert!(err.is_bounds());
    }
}
