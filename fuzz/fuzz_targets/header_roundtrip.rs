#![no_main]

use flx_wire::header::{MESSAGE_HEADER_LEN, SET_HEADER_LEN};
use flx_wire::{MessageHeader, SetHeader};
use libfuzzer_sys::fuzz_target;

// Fuzz target: message and set header read->write roundtrip.
//
// Any 20 bytes are a valid header pair; writing the parsed headers back
// must reproduce the input exactly.
fuzz_target!(|data: &[u8]| {
    if data.len() < MESSAGE_HEADER_LEN + SET_HEADER_LEN {
        return;
    }

    let mut buf = data;
    let header = MessageHeader::read_from(&mut buf).unwrap();
    let set = SetHeader::read_from(&mut buf).unwrap();

    let mut wire = Vec::new();
    header.write_to(&mut wire);
    set.write_to(&mut wire);
    assert_eq!(&wire[..], &data[..MESSAGE_HEADER_LEN + SET_HEADER_LEN]);
});
