#![no_main]

use flx_decoder::{DecoderConfig, ExportFormat, LengthCheck, decode_datagram};
use libfuzzer_sys::fuzz_target;

// Fuzz target: the per-datagram recovery boundary.
//
// Every input must produce an Outcome without panicking, under every
// format and length-check setting.
fuzz_target!(|data: &[u8]| {
    for format in [ExportFormat::Auto, ExportFormat::Ipfix, ExportFormat::Sflow] {
        for length_check in [LengthCheck::Ignore, LengthCheck::Strict] {
            let config = DecoderConfig { format, length_check };
            let _ = decode_datagram(data, &config);
        }
    }
});
