#![no_main]

use arbitrary::Arbitrary;
use flx_wire::DecodeCursor;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Next,
    NextRaw,
    Next64,
    Skip(u8),
    MarkUnique(bool),
    StringAtCursor,
}

#[derive(Debug, Arbitrary)]
struct Input {
    buf: Vec<u8>,
    ops: Vec<Op>,
}

// Fuzz target: arbitrary sequences of cursor operations.
//
// A failed read must leave the offset where it was, and a successful one
// must never leave the cursor past the capacity. Only skip may do that.
fuzz_target!(|input: Input| {
    let mut cursor = DecodeCursor::new(&input.buf);
    let mut slots = [None, None];

    for op in &input.ops {
        let before = cursor.offset();
        let ok = match op {
            Op::Next => cursor.next().is_ok(),
            Op::NextRaw => cursor.next_raw().is_ok(),
            Op::Next64 => {
                // a half-read value consumes its high word
                let ok = cursor.next_64().is_ok();
                if !ok {
                    assert!(cursor.offset() <= before + 1);
                }
                continue;
            }
            Op::Skip(n) => {
                cursor.skip(usize::from(*n));
                continue;
            }
            Op::MarkUnique(second) => {
                let _ = cursor.mark_unique(&mut slots[usize::from(*second)]);
                assert_eq!(cursor.offset(), before);
                continue;
            }
            Op::StringAtCursor => match cursor.string_at_cursor() {
                Ok(view) => {
                    assert_eq!(view.len(), (cursor.capacity() - cursor.offset()) * 4);
                    true
                }
                Err(_) => false,
            },
        };

        if ok {
            assert!(cursor.offset() <= cursor.capacity());
        } else {
            assert_eq!(cursor.offset(), before);
        }
        assert_eq!(cursor.has_remaining(0), cursor.offset() <= cursor.capacity());
    }
});
