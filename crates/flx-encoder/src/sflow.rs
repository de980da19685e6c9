use std::net::IpAddr;

use flx_types::sflow::{
    CounterElement, CounterSample, FlowElement, FlowSample, HostDescription, InterfaceCounters,
    SflowDatagram, SflowSample, address_type, counter_format, flow_format, sample_format,
};

use crate::error::EncodeError;
use crate::xdr::{XdrWriter, word_len};

/// sFlow v5 datagram encoder, the inverse of `SflowDecoder::decode`.
///
/// Sample and element lengths are computed from the encoded body, except
/// for `Unsupported` entries: those keep their stated length and carry a
/// zero-filled body of the whole words that length covers, which is what
/// the decoder skips.
pub struct SflowEncoder;

impl SflowEncoder {
    /// Serialize a whole datagram.
    ///
    /// # Errors
    ///
    /// [`EncodeError::LengthOverflow`] if any count or length does not fit
    /// in 32 bits.
    pub fn encode(datagram: &SflowDatagram) -> Result<Vec<u8>, EncodeError> {
        let mut w = XdrWriter::new();
        w.put_u32(datagram.version);
        match datagram.agent {
            IpAddr::V4(addr) => {
                w.put_u32(address_type::IPV4).put_opaque(&addr.octets());
            }
            IpAddr::V6(addr) => {
                w.put_u32(address_type::IPV6).put_opaque(&addr.octets());
            }
        }
        w.put_u32(datagram.sub_agent_id)
            .put_u32(datagram.sequence)
            .put_u32(datagram.uptime_ms)
            .put_u32(word_len("sample count", datagram.samples.len())?);

        for sample in &datagram.samples {
            match sample {
                SflowSample::Flow(flow) => {
                    w.put_framed(sample_format::FLOW, &flow_sample_body(flow)?)?;
                }
                SflowSample::Counters(counters) => {
                    w.put_framed(sample_format::COUNTERS, &counter_sample_body(counters)?)?;
                }
                SflowSample::Unsupported { tag, length } => {
                    put_unsupported(&mut w, *tag, *length);
                }
            }
        }

        Ok(w.into_bytes())
    }
}

fn flow_sample_body(sample: &FlowSample) -> Result<Vec<u8>, EncodeError> {
    let mut w = XdrWriter::new();
    w.put_u32(sample.sequence)
        .put_u32(sample.source_id)
        .put_u32(sample.sampling_rate)
        .put_u32(sample.sample_pool)
        .put_u32(sample.drops)
        .put_u32(sample.input)
        .put_u32(sample.output)
        .put_u32(word_len("element count", sample.elements.len())?);

    for element in &sample.elements {
        let (tag, body) = match element {
            FlowElement::Unsupported { tag, length } => {
                put_unsupported(&mut w, *tag, *length);
                continue;
            }
            FlowElement::RawHeader(raw) => {
                let mut e = XdrWriter::new();
                e.put_u32(raw.protocol)
                    .put_u32(raw.frame_length)
                    .put_u32(raw.stripped)
                    .put_string(&raw.header)?;
                (flow_format::RAW_HEADER, e.into_bytes())
            }
            FlowElement::Ethernet(eth) => {
                let mut e = XdrWriter::new();
                e.put_u32(eth.length)
                    .put_opaque(&eth.src_mac)
                    .put_opaque(&eth.dst_mac)
                    .put_u32(eth.eth_type);
                (flow_format::ETHERNET, e.into_bytes())
            }
            FlowElement::Ipv4(ip) => {
                let mut e = XdrWriter::new();
                e.put_u32(ip.length)
                    .put_u32(ip.protocol)
                    .put_opaque(&ip.src_ip.octets())
                    .put_opaque(&ip.dst_ip.octets())
                    .put_u32(ip.src_port)
                    .put_u32(ip.dst_port)
                    .put_u32(ip.tcp_flags)
                    .put_u32(ip.tos);
                (flow_format::IPV4, e.into_bytes())
            }
            FlowElement::ExtendedSwitch(sw) => {
                let mut e = XdrWriter::new();
                e.put_u32(sw.src_vlan)
                    .put_u32(sw.src_priority)
                    .put_u32(sw.dst_vlan)
                    .put_u32(sw.dst_priority);
                (flow_format::EXTENDED_SWITCH, e.into_bytes())
            }
        };
        w.put_framed(tag, &body)?;
    }

    Ok(w.into_bytes())
}

fn counter_sample_body(sample: &CounterSample) -> Result<Vec<u8>, EncodeError> {
    let mut w = XdrWriter::new();
    w.put_u32(sample.sequence)
        .put_u32(sample.source_id)
        .put_u32(word_len("element count", sample.elements.len())?);

    for element in &sample.elements {
        match element {
            CounterElement::GenericInterface(counters) => {
                w.put_framed(counter_format::GENERIC_INTERFACE, &interface_body(counters))?;
            }
            CounterElement::HostDescription(host) => {
                w.put_framed(counter_format::HOST_DESCRIPTION, &host_body(host)?)?;
            }
            CounterElement::Unsupported { tag, length } => {
                put_unsupported(&mut w, *tag, *length);
            }
        }
    }

    Ok(w.into_bytes())
}

fn interface_body(c: &InterfaceCounters) -> Vec<u8> {
    let mut w = XdrWriter::new();
    w.put_u32(c.if_index)
        .put_u32(c.if_type)
        .put_u64(c.if_speed)
        .put_u32(c.if_direction)
        .put_u32(c.if_status)
        .put_u64(c.in_octets)
        .put_u32(c.in_ucast_pkts)
        .put_u32(c.in_multicast_pkts)
        .put_u32(c.in_broadcast_pkts)
        .put_u32(c.in_discards)
        .put_u32(c.in_errors)
        .put_u32(c.in_unknown_protos)
        .put_u64(c.out_octets)
        .put_u32(c.out_ucast_pkts)
        .put_u32(c.out_multicast_pkts)
        .put_u32(c.out_broadcast_pkts)
        .put_u32(c.out_discards)
        .put_u32(c.out_errors)
        .put_u32(c.promiscuous_mode);
    w.into_bytes()
}

fn host_body(host: &HostDescription) -> Result<Vec<u8>, EncodeError> {
    let mut w = XdrWriter::new();
    w.put_string(host.hostname.as_bytes())?
        .put_opaque(&host.uuid)
        .put_u32(host.machine_type)
        .put_u32(host.os_name)
        .put_string(host.os_release.as_bytes())?;
    Ok(w.into_bytes())
}

fn put_unsupported(w: &mut XdrWriter, tag: u32, length: u32) {
    w.put_u32(tag)
        .put_u32(length)
        .put_opaque(&vec![0u8; length as usize / 4 * 4]);
}
