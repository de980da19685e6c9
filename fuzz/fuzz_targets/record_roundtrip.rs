#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use flx_decoder::{DecoderConfig, IpfixDecoder, LengthCheck};
use flx_encoder::IpfixEncoder;
use flx_types::{EthernetRecord, FlowRecord, IcmpRecord, RecordKind};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    icmp: bool,
    seq_number: u32,
    obs_domain_id: u32,
    body: Vec<u8>,
}

// Fuzz target: record encode->decode roundtrip.
//
// The record is built by decoding arbitrary body bytes with the selected
// layout, so every field takes arbitrary values. Encoding it as a datagram
// and decoding strictly must give back the same record.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(input) = FuzzInput::arbitrary(&mut u) else {
        return;
    };

    let kind = if input.icmp { RecordKind::Icmp } else { RecordKind::Ethernet };
    let record = match kind {
        RecordKind::Icmp => match IcmpRecord::decode_body(&input.body) {
            Ok(r) => FlowRecord::Icmp(r),
            Err(_) => return,
        },
        _ => match EthernetRecord::decode_body(&input.body) {
            Ok(r) => FlowRecord::Ethernet(r),
            Err(_) => return,
        },
    };

    let bytes = IpfixEncoder::new()
        .sequence(input.seq_number)
        .observation_domain(input.obs_domain_id)
        .record(record.clone())
        .encode()
        .unwrap();

    let config = DecoderConfig {
        length_check: LengthCheck::Strict,
        ..DecoderConfig::default()
    };
    let message = IpfixDecoder::decode(&bytes, &config).unwrap();
    assert_eq!(message.record, record);
    assert_eq!(message.header.seq_number, input.seq_number);
    assert_eq!(message.header.obs_domain_id, input.obs_domain_id);
});
