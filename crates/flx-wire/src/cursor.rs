use std::panic::Location;

use crate::error::{CursorError, CursorErrorKind};

/// Size of one cursor word in bytes.
pub const WORD_SIZE: usize = 4;

/// Word-granular, bounds-checked reader over a datagram buffer.
///
/// The cursor views the buffer as a sequence of 32-bit big-endian words.
/// Its capacity is `len / 4`: trailing bytes that do not make up a whole
/// word are never readable.
///
/// ```text
///  buf:  [w0][w1][w2][w3][..]      capacity = 4, trailing 2 bytes ignored
///              ^
///            offset = 1
/// ```
///
/// Every read either returns a value and advances, or returns a
/// [`CursorError`] and leaves the offset untouched. Decoders propagate the
/// error with `?` up to the single per-datagram recovery point, so no
/// partially decoded structure escapes.
///
/// [`skip`](Self::skip) is the one unchecked movement: it may carry the
/// offset past the capacity, in which case the next read fails.
#[derive(Debug, Clone)]
pub struct DecodeCursor<'a> {
    buf: &'a [u8],
    offset: usize,
    capacity: usize,
}

impl<'a> DecodeCursor<'a> {
    /// Bind a cursor to `buf`, starting at word 0.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            capacity: buf.len() / WORD_SIZE,
        }
    }

    /// Current word offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of whole words in the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read one word, converted from big-endian to host order.
    ///
    /// # Errors
    ///
    /// [`CursorErrorKind::BoundsExceeded`] when no whole word remains.
    #[track_caller]
    pub fn next(&mut self) -> Result<u32, CursorError> {
        self.take_word().map(u32::from_be_bytes)
    }

    /// Read one word exactly as it sits on the wire, without byte-order
    /// conversion. Used for fields that are compared or copied as raw
    /// network-order values, such as IPv4 addresses.
    ///
    /// # Errors
    ///
    /// [`CursorErrorKind::BoundsExceeded`] when no whole word remains.
    #[track_caller]
    pub fn next_raw(&mut self) -> Result<u32, CursorError> {
        self.take_word().map(u32::from_ne_bytes)
    }

    /// Read a 64-bit value from two consecutive words, high word first.
    ///
    /// # Errors
    ///
    /// [`CursorErrorKind::BoundsExceeded`] if either word is missing. When
    /// only the high word is available it is still consumed.
    #[track_caller]
    pub fn next_64(&mut self) -> Result<u64, CursorError> {
        let high = u64::from(self.next()?);
        let low = u64::from(self.next()?);
        Ok((high << 32) | low)
    }

    /// `true` iff `n` more words can be read.
    #[must_use]
    pub fn has_remaining(&self, n: usize) -> bool {
        self.offset
            .checked_add(n)
            .is_some_and(|end| end <= self.capacity)
    }

    /// Advance by `n` words without a bounds check.
    pub fn skip(&mut self, n: usize) {
        self.offset = self.offset.saturating_add(n);
    }

    /// The offset the cursor will have after `n` more words.
    #[must_use]
    pub fn mark(&self, n: usize) -> usize {
        self.offset.saturating_add(n)
    }

    /// `true` iff the cursor sits exactly at `expected`.
    #[must_use]
    pub fn mark_ok(&self, expected: usize) -> bool {
        self.offset == expected
    }

    /// Record the current offset in a once-only slot.
    ///
    /// # Errors
    ///
    /// [`CursorErrorKind::DuplicateStructure`] if the slot already holds an
    /// offset. The slot keeps its first value.
    #[track_caller]
    pub fn mark_unique(&self, slot: &mut Option<usize>) -> Result<(), CursorError> {
        if slot.is_some() {
            return Err(self.fail(CursorErrorKind::DuplicateStructure));
        }
        *slot = Some(self.offset);
        Ok(())
    }

    /// View of the word-accessible bytes from the current offset onwards.
    ///
    /// The cursor does not advance; callers take the length they need from
    /// the surrounding structure and then [`skip`](Self::skip) over it.
    ///
    /// # Errors
    ///
    /// [`CursorErrorKind::BoundsExceeded`] if a previous `skip` carried the
    /// offset past the capacity.
    #[track_caller]
    pub fn string_at_cursor(&self) -> Result<&'a [u8], CursorError> {
        if self.offset > self.capacity {
            return Err(self.fail(CursorErrorKind::BoundsExceeded));
        }
        Ok(&self.buf[self.offset * WORD_SIZE..self.capacity * WORD_SIZE])
    }

    #[track_caller]
    fn take_word(&mut self) -> Result<[u8; WORD_SIZE], CursorError> {
        if self.offset >= self.capacity {
            return Err(self.fail(CursorErrorKind::BoundsExceeded));
        }
        let start = self.offset * WORD_SIZE;
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(&self.buf[start..start + WORD_SIZE]);
        self.offset += 1;
        Ok(word)
    }

    #[track_caller]
    fn fail(&self, kind: CursorErrorKind) -> CursorError {
        CursorError {
            kind,
            offset: self.offset,
            capacity: self.capacity,
            location: Location::caller(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    #[test]
    fn capacity_ignores_partial_word() {
        let buf = [0u8; 11];
        let cursor = DecodeCursor::new(&buf);
        assert_eq!(cursor.capacity(), 2);
    }

    #[test]
    fn next_reads_capacity_words_then_fails() {
        let buf = words(&[1, 2, 3]);
        let mut cursor = DecodeCursor::new(&buf);
        assert_eq!(cursor.next().unwrap(), 1);
        assert_eq!(cursor.next().unwrap(), 2);
        assert_eq!(cursor.next().unwrap(), 3);

        let err = cursor.next().unwrap_err();
        assert_eq!(err.kind, CursorErrorKind::BoundsExceeded);
        assert_eq!(err.offset, 3);
        assert_eq!(err.capacity, 3);
        assert_eq!(cursor.offset(), 3, "failed read must not move the cursor");
    }

    #[test]
    fn error_location_points_at_caller() {
        let mut cursor = DecodeCursor::new(&[]);
        let err = cursor.next().unwrap_err();
        assert!(err.location.file().ends_with("cursor.rs"));
        assert!(err.to_string().starts_with("bounds exceeded at word 0 of 0"));
    }

    #[test]
    fn trailing_bytes_are_inaccessible() {
        let mut buf = words(&[0xAABB_CCDD]);
        buf.extend_from_slice(&[1, 2, 3]);
        let mut cursor = DecodeCursor::new(&buf);
        assert_eq!(cursor.next().unwrap(), 0xAABB_CCDD);
        assert!(cursor.next().unwrap_err().is_bounds());
    }

    #[test]
    fn next_raw_keeps_wire_order() {
        let buf = [192, 168, 1, 10];
        let mut cursor = DecodeCursor::new(&buf);
        let raw = cursor.next_raw().unwrap();
        assert_eq!(raw.to_ne_bytes(), [192, 168, 1, 10]);
    }

    #[test]
    fn next_64_is_high_word_first() {
        let buf = words(&[0x0000_0001, 0x0000_0002]);
        let mut cursor = DecodeCursor::new(&buf);
        assert_eq!(cursor.next_64().unwrap(), 0x0000_0001_0000_0002);
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn next_64_fails_on_half_value() {
        let buf = words(&[7]);
        let mut cursor = DecodeCursor::new(&buf);
        assert!(cursor.next_64().unwrap_err().is_bounds());
    }

    #[test]
    fn has_remaining_is_pure() {
        let buf = words(&[1, 2]);
        let mut cursor = DecodeCursor::new(&buf);
        assert!(cursor.has_remaining(0));
        assert!(cursor.has_remaining(2));
        assert!(!cursor.has_remaining(3));
        assert!(!cursor.has_remaining(usize::MAX));
        cursor.next().unwrap();
        assert!(cursor.has_remaining(1));
        assert!(!cursor.has_remaining(2));
        assert_eq!(cursor.offset(), 1);
    }

    #[test]
    fn skip_past_end_makes_next_read_fail() {
        let buf = words(&[1, 2]);
        let mut cursor = DecodeCursor::new(&buf);
        cursor.skip(5);
        assert_eq!(cursor.offset(), 5);
        assert!(!cursor.has_remaining(0));
        assert!(cursor.next().unwrap_err().is_bounds());
        assert!(cursor.string_at_cursor().unwrap_err().is_bounds());
    }

    #[test]
    fn mark_and_mark_ok() {
        let buf = words(&[1, 2, 3, 4]);
        let mut cursor = DecodeCursor::new(&buf);
        let end = cursor.mark(2);
        assert_eq!(end, 2);
        assert_eq!(cursor.offset(), 0);
        assert!(!cursor.mark_ok(end));

        cursor.next().unwrap();
        assert!(!cursor.mark_ok(end), "under-read is detected");
        cursor.next().unwrap();
        assert!(cursor.mark_ok(end));
        cursor.next().unwrap();
        assert!(!cursor.mark_ok(end), "over-read is detected");
    }

    #[test]
    fn mark_unique_rejects_second_mark() {
        let buf = words(&[1, 2]);
        let mut cursor = DecodeCursor::new(&buf);
        let mut slot = None;

        cursor.mark_unique(&mut slot).unwrap();
        assert_eq!(slot, Some(0));

        cursor.next().unwrap();
        let err = cursor.mark_unique(&mut slot).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(err.offset, 1);
        assert_eq!(slot, Some(0));
    }

    #[test]
    fn string_at_cursor_views_remaining_words() {
        let mut buf = b"abcdefgh".to_vec();
        buf.push(b'!');
        let mut cursor = DecodeCursor::new(&buf);
        cursor.next().unwrap();
        assert_eq!(cursor.string_at_cursor().unwrap(), b"efgh");
        cursor.next().unwrap();
        assert_eq!(cursor.string_at_cursor().unwrap(), b"");
    }
}
