use bytes::{Buf, Bytes};

/// Remove and return the first `n` bytes of `buf`, or `None` when fewer
/// than `n` remain. On `None` the buffer is left untouched.
///
/// This is the only buffer operation the IPFIX decoder relies on: every
/// fixed-size structure is pulled whole before any field is read from it.
pub fn try_pull<B: Buf>(buf: &mut B, n: usize) -> Option<Bytes> {
    if buf.remaining() < n {
        return None;
    }
    Some(buf.copy_to_bytes(n))
}
