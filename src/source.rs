//! Random-access source text and the rolling fragment buffer the scanner
//! reads through.

use tracing::trace;

/// A random-access source of UTF-8 bytes with a known length.
pub trait SourceText {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies up to `dest.len()` bytes starting at `offset` and returns the
    /// number of bytes copied. Copies nothing at or past the end.
    fn copy_to(&self, offset: usize, dest: &mut [u8]) -> usize;
}

impl SourceText for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_to(&self, offset: usize, dest: &mut [u8]) -> usize {
        if offset >= <[u8]>::len(self) {
            return 0;
        }
        let count = dest.len().min(<[u8]>::len(self) - offset);
        dest[..count].copy_from_slice(&self[offset..offset + count]);
        count
    }
}

impl SourceText for str {
    fn len(&self) -> usize {
        str::len(self)
    }

    fn copy_to(&self, offset: usize, dest: &mut [u8]) -> usize {
        self.as_bytes().copy_to(offset, dest)
    }
}

impl SourceText for String {
    fn len(&self) -> usize {
        String::len(self)
    }

    fn copy_to(&self, offset: usize, dest: &mut [u8]) -> usize {
        self.as_bytes().copy_to(offset, dest)
    }
}

impl SourceText for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn copy_to(&self, offset: usize, dest: &mut [u8]) -> usize {
        self.as_slice().copy_to(offset, dest)
    }
}

impl<T: SourceText + ?Sized> SourceText for &T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn copy_to(&self, offset: usize, dest: &mut [u8]) -> usize {
        (**self).copy_to(offset, dest)
    }
}

pub const INITIAL_FRAGMENT_SIZE: usize = 16;

/// An absolute document offset saved for a later rewind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mark(pub(crate) usize);

impl Mark {
    pub fn offset(self) -> usize {
        self.0
    }
}

/// A window over a [`SourceText`] that holds the current token.
///
/// Positions are absolute document offsets. The window always starts at or
/// before `start` (the first byte of the token being scanned), so the bytes
/// of the current token stay addressable until the next token begins. The
/// byte one past the last copied byte is always NUL.
#[derive(Debug)]
pub struct FragmentBuffer<S> {
    source: S,
    len: usize,
    buf: Vec<u8>,
    fragment_size: usize,
    buf_offset: usize,
    buf_len: usize,
    start: usize,
    end: usize,
    refills: usize,
}

impl<S: SourceText> FragmentBuffer<S> {
    pub fn new(source: S) -> Self {
        Self::with_fragment_size(source, INITIAL_FRAGMENT_SIZE)
    }

    pub fn with_fragment_size(source: S, fragment_size: usize) -> Self {
        let len = source.len();
        let mut buffer = FragmentBuffer {
            source,
            len,
            buf: Vec::new(),
            fragment_size: fragment_size.max(1),
            buf_offset: 0,
            buf_len: 0,
            start: 0,
            end: 0,
            refills: 0,
        };
        buffer.refill_from(0);
        buffer
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Start of the current token.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The cursor; one past the last consumed byte.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn at_end(&self) -> bool {
        self.end >= self.len
    }

    /// Number of fragment copies so far.
    pub fn refills(&self) -> usize {
        self.refills
    }

    /// Begins a new token at the cursor.
    pub fn begin_token(&mut self) {
        self.start = self.end;
    }

    /// Byte under the cursor, or NUL at the end of the document.
    pub fn current(&mut self) -> u8 {
        self.peek(0)
    }

    /// Byte `ahead` positions past the cursor, or NUL past the end.
    pub fn peek(&mut self, ahead: usize) -> u8 {
        let pos = self.end + ahead;
        if self.ensure(pos) {
            self.buf[pos - self.buf_offset]
        } else {
            0
        }
    }

    /// Consumes one byte.
    pub fn advance(&mut self) {
        if self.end < self.len {
            self.end += 1;
        }
    }

    pub fn advance_by(&mut self, count: usize) {
        self.end = (self.end + count).min(self.len);
    }

    /// Moves the cursor back within the current token.
    pub fn retreat(&mut self, count: usize) {
        self.end = self.end.saturating_sub(count).max(self.start);
    }

    /// Moves the cursor to an absolute offset at or after the token start.
    pub fn seek(&mut self, pos: usize) {
        self.end = pos.clamp(self.start, self.len);
    }

    pub fn save(&self) -> Mark {
        Mark(self.end)
    }

    /// Rewinds (or fast-forwards) to a saved offset with a fresh fragment.
    pub fn restore(&mut self, mark: Mark) {
        let pos = mark.0.min(self.len);
        self.start = pos;
        self.end = pos;
        self.refill_from(pos);
    }

    /// Bytes in `from..to` if they are resident. The current token is
    /// always resident.
    pub fn slice(&self, from: usize, to: usize) -> Option<&[u8]> {
        if from < self.buf_offset || to > self.buf_offset + self.buf_len || from > to {
            return None;
        }
        Some(&self.buf[from - self.buf_offset..to - self.buf_offset])
    }

    /// Bytes of the current token.
    pub fn token_bytes(&self) -> &[u8] {
        self.slice(self.start, self.end).unwrap_or(&[])
    }

    /// One past the last resident byte.
    pub fn resident_end(&self) -> usize {
        self.buf_offset + self.buf_len
    }

    fn ensure(&mut self, pos: usize) -> bool {
        if pos >= self.len {
            return false;
        }
        while pos >= self.buf_offset + self.buf_len {
            if self.start == self.buf_offset {
                // The fragment holds nothing but the current token.
                self.fragment_size *= 2;
            }
            let before = self.buf_offset + self.buf_len;
            self.refill_from(self.start);
            if self.buf_offset + self.buf_len <= before && self.buf_len < self.fragment_size {
                return false;
            }
        }
        true
    }

    fn refill_from(&mut self, offset: usize) {
        self.buf.resize(self.fragment_size + 1, 0);
        let count = self
            .source
            .copy_to(offset, &mut self.buf[..self.fragment_size])
            .min(self.fragment_size);
        self.buf[count] = 0;
        self.buf_offset = offset;
        self.buf_len = count;
        self.refills += 1;
        trace!(offset, count, fragment_size = self.fragment_size, "refill");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all<S: SourceText>(buffer: &mut FragmentBuffer<S>) -> Vec<u8> {
        let mut out = Vec::new();
        while !buffer.at_end() {
            buffer.begin_token();
            out.push(buffer.current());
            buffer.advance();
        }
        out
    }

    #[test]
    fn test_reads_across_fragments() {
        let text = "abcdefghijklmnopqrstuvwxyz0123456789";
        let mut buffer = FragmentBuffer::with_fragment_size(text, 4);
        assert_eq!(read_all(&mut buffer), text.as_bytes());
        assert!(buffer.refills() > 1);
        assert_eq!(buffer.current(), 0);
    }

    #[test]
    fn test_long_token_grows_fragment() {
        let text = "x".repeat(100);
        let mut buffer = FragmentBuffer::with_fragment_size(text.as_str(), 2);
        buffer.begin_token();
        while buffer.current() != 0 {
            buffer.advance();
        }
        assert_eq!(buffer.token_bytes(), text.as_bytes());
    }

    #[test]
    fn test_restore_rewinds_exactly() {
        let text = "0123456789";
        let mut buffer = FragmentBuffer::with_fragment_size(text, 3);
        buffer.advance_by(2);
        let mark = buffer.save();
        buffer.advance_by(5);
        buffer.begin_token();
        assert_eq!(buffer.current(), b'7');
        buffer.restore(mark);
        assert_eq!(buffer.current(), b'2');
        assert_eq!(buffer.start(), 2);
    }

    #[test]
    fn test_empty_source() {
        let mut buffer = FragmentBuffer::new("");
        assert!(buffer.at_end());
        assert_eq!(buffer.current(), 0);
        assert_eq!(buffer.peek(3), 0);
    }
}
