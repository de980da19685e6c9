use bytes::BufMut;

use crate::error::EncodeError;

/// Word-oriented XDR writer, the write-side counterpart of the decoder's
/// word cursor.
///
/// Every scalar occupies whole 32-bit big-endian words; opaque data is
/// zero-padded to the next word boundary.
#[derive(Clone, Debug, Default)]
pub struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.put_u32(value);
        self
    }

    /// Write a 64-bit value as two words, high word first.
    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.buf.put_u64(value);
        self
    }

    /// Write bytes exactly as given (network order), padded to a word.
    pub fn put_opaque(&mut self, data: &[u8]) -> &mut Self {
        self.buf.put_slice(data);
        self.pad();
        self
    }

    /// Write a length-prefixed byte string, padded to a word.
    ///
    /// # Errors
    ///
    /// [`EncodeError::LengthOverflow`] if `data` is longer than `u32::MAX`.
    pub fn put_string(&mut self, data: &[u8]) -> Result<&mut Self, EncodeError> {
        self.put_u32(word_len("string", data.len())?);
        Ok(self.put_opaque(data))
    }

    /// Write `tag`, the byte length of `body`, then `body` itself.
    ///
    /// # Errors
    ///
    /// [`EncodeError::LengthOverflow`] if `body` is longer than `u32::MAX`.
    pub fn put_framed(&mut self, tag: u32, body: &[u8]) -> Result<&mut Self, EncodeError> {
        self.put_u32(tag);
        self.put_u32(word_len("frame", body.len())?);
        Ok(self.put_opaque(body))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn pad(&mut self) {
        let rem = self.buf.len() % 4;
        if rem != 0 {
            self.buf.put_bytes(0, 4 - rem);
        }
    }
}

pub(crate) fn word_len(structure: &'static str, len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::LengthOverflow {
        structure,
        len,
        bits: 32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_is_padded() {
        let mut w = XdrWriter::new();
        w.put_opaque(&[1, 2, 3, 4, 5]);
        assert_eq!(w.into_bytes(), vec![1, 2, 3, 4, 5, 0, 0, 0]);
    }

    #[test]
    fn string_is_length_prefixed() {
        let mut w = XdrWriter::new();
        w.put_string(b"sw1").unwrap();
        assert_eq!(w.into_bytes(), vec![0, 0, 0, 3, b's', b'w', b'1', 0]);
    }

    #[test]
    fn framed_body_carries_byte_length() {
        let mut w = XdrWriter::new();
        w.put_framed(1001, &[0xAA; 8]).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(&bytes[0..4], &1001u32.to_be_bytes());
        assert_eq!(&bytes[4..8], &8u32.to_be_bytes());
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn u64_is_high_word_first() {
        let mut w = XdrWriter::new();
        w.put_u64(0x0000_0001_0000_0002);
        assert_eq!(w.into_bytes(), vec![0, 0, 0, 1, 0, 0, 0, 2]);
    }
}
