#![no_main]

use flx_decoder::SflowDecoder;
use flx_encoder::SflowEncoder;
use libfuzzer_sys::fuzz_target;

// Fuzz target: sFlow decode over the word cursor.
//
// Prefixing the version word steers every input past the version check.
// Whatever decodes must re-encode to a datagram that decodes to the same
// value.
fuzz_target!(|data: &[u8]| {
    let mut bytes = 5u32.to_be_bytes().to_vec();
    bytes.extend_from_slice(data);

    let Ok(decoded) = SflowDecoder::decode(&bytes) else {
        return;
    };
    let reencoded = SflowEncoder::encode(&decoded).unwrap();
    let again = SflowDecoder::decode(&reencoded).unwrap();
    assert_eq!(again, decoded);
});
