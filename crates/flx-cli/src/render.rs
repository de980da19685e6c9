//! Text and JSON rendering of decoded datagrams.
//!
//! Text output follows the collector's line format:
//!
//! ```text
//! header: v10, length 65, export time 0, seq 1, observation domain 7
//! set: id 256, length 49
//! ethernet: obs point 42, direction 0, src 00:01:02:03:04:05, ...
//! ```
//!
//! JSON output is one object per datagram, keyed by field name.

use std::fmt::Write as _;
use std::net::Ipv4Addr;

use flx_decoder::{Datagram, IpfixMessage};
use flx_types::sflow::{
    CounterElement, CounterSample, FlowElement, FlowSample, SflowDatagram, SflowSample, split_tag,
};
use flx_types::{EthernetRecord, FlowRecord, IcmpRecord};
use serde_json::{Value, json};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Render `datagram` in `mode`. Text output ends with a newline; JSON is a
/// single line without one.
pub fn render(datagram: &Datagram, mode: OutputMode) -> String {
    match mode {
        OutputMode::Text => text(datagram),
        OutputMode::Json => json(datagram).to_string(),
    }
}

pub fn text(datagram: &Datagram) -> String {
    match datagram {
        Datagram::Ipfix(message) => ipfix_text(message),
        Datagram::Sflow(sflow) => sflow_text(sflow),
    }
}

pub fn json(datagram: &Datagram) -> Value {
    match datagram {
        Datagram::Ipfix(message) => ipfix_json(message),
        Datagram::Sflow(sflow) => sflow_json(sflow),
    }
}

fn mac(bytes: &[u8; 6]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

// ── IPFIX ─────────────────────────────────────────────────────────────────────

fn ipfix_text(message: &IpfixMessage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", message.header);
    let _ = writeln!(out, "{}", message.set);
    match &message.record {
        FlowRecord::Ethernet(r) => {
            let _ = writeln!(
                out,
                "ethernet: obs point {}, direction {}, src {}, dst {}, eth type 0x{:04x}, \
                 hdlen {}, start {}, end {}, packets {}, octets {}, end reason {}",
                r.obs_point_id,
                r.direction,
                mac(&r.src_mac),
                mac(&r.dst_mac),
                r.eth_type,
                r.eth_hdlen,
                r.start_time,
                r.end_time,
                r.packets,
                r.octet_delta_count,
                r.flow_end_reason,
            );
        }
        FlowRecord::Icmp(r) => {
            let _ = writeln!(
                out,
                "icmp: obs point {}, direction {}, src {}, dst {}, eth type 0x{:04x}, hdlen {}",
                r.obs_point_id,
                r.direction,
                mac(&r.src_mac),
                mac(&r.dst_mac),
                r.eth_type,
                r.eth_hdlen,
            );
            let _ = writeln!(
                out,
                "  ip: v{} ttl {} proto {} dscp {} precedence {} tos {}, {} -> {}",
                r.ip_version,
                r.ip_ttl,
                r.ip_proto,
                r.dscp,
                r.ip_precedence,
                r.ip_tos,
                Ipv4Addr::from(r.src_ip),
                Ipv4Addr::from(r.dst_ip),
            );
            let _ = writeln!(
                out,
                "  icmp type {} code {}, start {}, end {}, packets {}, octets {}, end reason {}",
                r.icmp_type,
                r.icmp_code,
                r.start_time,
                r.end_time,
                r.packets,
                r.octet_delta_count,
                r.flow_end_reason,
            );
            let _ = writeln!(
                out,
                "  octets {}, delta octets squared {}, min len {}, max len {}",
                r.octets, r.delta_octets_squared, r.min_len, r.max_len,
            );
        }
        FlowRecord::Unsupported { set_id } => {
            let _ = writeln!(out, "unsupported set id {set_id}");
        }
    }
    out
}

fn ipfix_json(message: &IpfixMessage) -> Value {
    let h = &message.header;
    json!({
        "format": "ipfix",
        "header": {
            "version": h.version,
            "length": h.length,
            "export_time": h.export_time,
            "seq_number": h.seq_number,
            "obs_domain_id": h.obs_domain_id,
        },
        "set": {
            "set_id": message.set.set_id,
            "length": message.set.length,
        },
        "record": record_json(&message.record),
    })
}

fn record_json(record: &FlowRecord) -> Value {
    match record {
        FlowRecord::Ethernet(r) => ethernet_json(r),
        FlowRecord::Icmp(r) => icmp_json(r),
        FlowRecord::Unsupported { set_id } => json!({
            "kind": "unsupported",
            "set_id": set_id,
        }),
    }
}

fn ethernet_json(r: &EthernetRecord) -> Value {
    json!({
        "kind": "ethernet",
        "obs_point_id": r.obs_point_id,
        "direction": r.direction,
        "src_mac": mac(&r.src_mac),
        "dst_mac": mac(&r.dst_mac),
        "eth_type": r.eth_type,
        "eth_hdlen": r.eth_hdlen,
        "start_time": r.start_time,
        "end_time": r.end_time,
        "packets": r.packets,
        "octet_delta_count": r.octet_delta_count,
        "flow_end_reason": r.flow_end_reason,
    })
}

fn icmp_json(r: &IcmpRecord) -> Value {
    json!({
        "kind": "icmp",
        "obs_point_id": r.obs_point_id,
        "direction": r.direction,
        "src_mac": mac(&r.src_mac),
        "dst_mac": mac(&r.dst_mac),
        "eth_type": r.eth_type,
        "eth_hdlen": r.eth_hdlen,
        "ip_version": r.ip_version,
        "ip_ttl": r.ip_ttl,
        "ip_proto": r.ip_proto,
        "dscp": r.dscp,
        "ip_precedence": r.ip_precedence,
        "ip_tos": r.ip_tos,
        "src_ip": Ipv4Addr::from(r.src_ip).to_string(),
        "dst_ip": Ipv4Addr::from(r.dst_ip).to_string(),
        "icmp_type": r.icmp_type,
        "icmp_code": r.icmp_code,
        "start_time": r.start_time,
        "end_time": r.end_time,
        "packets": r.packets,
        "octet_delta_count": r.octet_delta_count,
        "flow_end_reason": r.flow_end_reason,
        "octets": r.octets,
        "delta_octets_squared": r.delta_octets_squared,
        "min_len": r.min_len,
        "max_len": r.max_len,
    })
}

// ── sFlow ─────────────────────────────────────────────────────────────────────

fn sflow_text(d: &SflowDatagram) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "sflow: v{}, agent {}, sub agent {}, seq {}, uptime {} ms, {} samples",
        d.version,
        d.agent,
        d.sub_agent_id,
        d.sequence,
        d.uptime_ms,
        d.samples.len(),
    );
    for sample in &d.samples {
        match sample {
            SflowSample::Flow(flow) => flow_text(&mut out, flow),
            SflowSample::Counters(counters) => counters_text(&mut out, counters),
            SflowSample::Unsupported { tag, length } => {
                let (enterprise, format) = split_tag(*tag);
                let _ = writeln!(
                    out,
                    "  unsupported sample: enterprise {enterprise}, format {format}, {length} bytes"
                );
            }
        }
    }
    out
}

fn flow_text(out: &mut String, s: &FlowSample) {
    let _ = writeln!(
        out,
        "  flow sample: seq {}, source {}, rate {}, pool {}, drops {}, in {}, out {}",
        s.sequence, s.source_id, s.sampling_rate, s.sample_pool, s.drops, s.input, s.output,
    );
    for element in &s.elements {
        let _ = match element {
            FlowElement::RawHeader(h) => writeln!(
                out,
                "    raw header: protocol {}, frame length {}, stripped {}, {} header bytes",
                h.protocol,
                h.frame_length,
                h.stripped,
                h.header.len(),
            ),
            FlowElement::Ethernet(e) => writeln!(
                out,
                "    ethernet: length {}, src {}, dst {}, eth type 0x{:04x}",
                e.length,
                mac(&e.src_mac),
                mac(&e.dst_mac),
                e.eth_type,
            ),
            FlowElement::Ipv4(ip) => writeln!(
                out,
                "    ipv4: {}:{} -> {}:{}, protocol {}, tcp flags 0x{:02x}, tos {}",
                ip.src_ip, ip.src_port, ip.dst_ip, ip.dst_port, ip.protocol, ip.tcp_flags, ip.tos,
            ),
            FlowElement::ExtendedSwitch(sw) => writeln!(
                out,
                "    extended switch: src vlan {} priority {}, dst vlan {} priority {}",
                sw.src_vlan, sw.src_priority, sw.dst_vlan, sw.dst_priority,
            ),
            FlowElement::Unsupported { tag, length } => {
                let (enterprise, format) = split_tag(*tag);
                writeln!(
                    out,
                    "    unsupported element: enterprise {enterprise}, format {format}, {length} bytes"
                )
            }
        };
    }
}

fn counters_text(out: &mut String, s: &CounterSample) {
    let _ = writeln!(
        out,
        "  counter sample: seq {}, source {}",
        s.sequence, s.source_id
    );
    for element in &s.elements {
        let _ = match element {
            CounterElement::GenericInterface(c) => writeln!(
                out,
                "    interface {}: type {}, speed {}, status {}, in {} octets / {} errors, \
                 out {} octets / {} errors",
                c.if_index,
                c.if_type,
                c.if_speed,
                c.if_status,
                c.in_octets,
                c.in_errors,
                c.out_octets,
                c.out_errors,
            ),
            CounterElement::HostDescription(h) => writeln!(
                out,
                "    host: {}, machine type {}, os {} release {}",
                h.hostname, h.machine_type, h.os_name, h.os_release,
            ),
            CounterElement::Unsupported { tag, length } => {
                let (enterprise, format) = split_tag(*tag);
                writeln!(
                    out,
                    "    unsupported element: enterprise {enterprise}, format {format}, {length} bytes"
                )
            }
        };
    }
}

fn sflow_json(d: &SflowDatagram) -> Value {
    let samples: Vec<Value> = d.samples.iter().map(sample_json).collect();
    json!({
        "format": "sflow",
        "version": d.version,
        "agent": d.agent.to_string(),
        "sub_agent_id": d.sub_agent_id,
        "sequence": d.sequence,
        "uptime_ms": d.uptime_ms,
        "samples": samples,
    })
}

fn sample_json(sample: &SflowSample) -> Value {
    match sample {
        SflowSample::Flow(s) => {
            let elements: Vec<Value> = s.elements.iter().map(flow_element_json).collect();
            json!({
                "kind": "flow",
                "sequence": s.sequence,
                "source_id": s.source_id,
                "sampling_rate": s.sampling_rate,
                "sample_pool": s.sample_pool,
                "drops": s.drops,
                "input": s.input,
                "output": s.output,
                "elements": elements,
            })
        }
        SflowSample::Counters(s) => {
            let elements: Vec<Value> = s.elements.iter().map(counter_element_json).collect();
            json!({
                "kind": "counters",
                "sequence": s.sequence,
                "source_id": s.source_id,
                "elements": elements,
            })
        }
        SflowSample::Unsupported { tag, length } => unsupported_json(*tag, *length),
    }
}

fn flow_element_json(element: &FlowElement) -> Value {
    match element {
        FlowElement::RawHeader(h) => json!({
            "kind": "raw_header",
            "protocol": h.protocol,
            "frame_length": h.frame_length,
            "stripped": h.stripped,
            "header": hex::encode(&h.header),
        }),
        FlowElement::Ethernet(e) => json!({
            "kind": "ethernet",
            "length": e.length,
            "src_mac": mac(&e.src_mac),
            "dst_mac": mac(&e.dst_mac),
            "eth_type": e.eth_type,
        }),
        FlowElement::Ipv4(ip) => json!({
            "kind": "ipv4",
            "length": ip.length,
            "protocol": ip.protocol,
            "src_ip": ip.src_ip.to_string(),
            "dst_ip": ip.dst_ip.to_string(),
            "src_port": ip.src_port,
            "dst_port": ip.dst_port,
            "tcp_flags": ip.tcp_flags,
            "tos": ip.tos,
        }),
        FlowElement::ExtendedSwitch(sw) => json!({
            "kind": "extended_switch",
            "src_vlan": sw.src_vlan,
            "src_priority": sw.src_priority,
            "dst_vlan": sw.dst_vlan,
            "dst_priority": sw.dst_priority,
        }),
        FlowElement::Unsupported { tag, length } => unsupported_json(*tag, *length),
    }
}

fn counter_element_json(element: &CounterElement) -> Value {
    match element {
        CounterElement::GenericInterface(c) => json!({
            "kind": "generic_interface",
            "if_index": c.if_index,
            "if_type": c.if_type,
            "if_speed": c.if_speed,
            "if_direction": c.if_direction,
            "if_status": c.if_status,
            "in_octets": c.in_octets,
            "in_ucast_pkts": c.in_ucast_pkts,
            "in_multicast_pkts": c.in_multicast_pkts,
            "in_broadcast_pkts": c.in_broadcast_pkts,
            "in_discards": c.in_discards,
            "in_errors": c.in_errors,
            "in_unknown_protos": c.in_unknown_protos,
            "out_octets": c.out_octets,
            "out_ucast_pkts": c.out_ucast_pkts,
            "out_multicast_pkts": c.out_multicast_pkts,
            "out_broadcast_pkts": c.out_broadcast_pkts,
            "out_discards": c.out_discards,
            "out_errors": c.out_errors,
            "promiscuous_mode": c.promiscuous_mode,
        }),
        CounterElement::HostDescription(h) => json!({
            "kind": "host_description",
            "hostname": h.hostname,
            "uuid": hex::encode(h.uuid),
            "machine_type": h.machine_type,
            "os_name": h.os_name,
            "os_release": h.os_release,
        }),
        CounterElement::Unsupported { tag, length } => unsupported_json(*tag, *length),
    }
}

fn unsupported_json(tag: u32, length: u32) -> Value {
    let (enterprise, format) = split_tag(tag);
    json!({
        "kind": "unsupported",
        "enterprise": enterprise,
        "format": format,
        "length": length,
    })
}
