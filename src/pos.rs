use bstr::ByteSlice;

/// A zero-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// Length of the line terminator at `i`. `\r\n` is a single terminator, as
/// are NEL and the Unicode line and paragraph separators.
fn line_terminator_len(source: &[u8], i: usize) -> Option<usize> {
    match source.get(i..)? {
        [b'\r', b'\n', ..] => Some(2),
        [b'\r' | b'\n', ..] => Some(1),
        [0xC2, 0x85, ..] => Some(2),
        [0xE2, 0x80, 0xA8 | 0xA9, ..] => Some(3),
        _ => None,
    }
}

/// Maps byte offsets to line and column positions.
#[derive(Debug, Clone)]
pub struct SourceLocator {
    /// Offset of the first byte of every line but the first.
    line_starts: Vec<usize>,
}

impl SourceLocator {
    pub fn new(source: &[u8]) -> Self {
        let mut line_starts = Vec::new();
        let mut i = 0;
        while i < source.len() {
            match line_terminator_len(source, i) {
                Some(len) => {
                    i += len;
                    line_starts.push(i);
                }
                None => i += 1,
            }
        }
        SourceLocator { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len() + 1
    }

    /// Position of `index`, with the column measured by `counter` over the
    /// bytes between the start of the line and `index`.
    pub fn position_general<F>(&self, source: &[u8], index: usize, counter: F) -> Position
    where
        F: FnOnce(&[u8]) -> u32,
    {
        let index = index.min(source.len());
        let line = self.line_starts.partition_point(|&start| start <= index);
        let line_beginning = if line == 0 { 0 } else { self.line_starts[line - 1] };
        let character = counter(&source[line_beginning..index]);
        Position {
            line: line as u32,
            character,
        }
    }

    pub fn position_utf8(&self, source: &[u8], index: usize) -> Position {
        self.position_general(source, index, |line| line.len() as u32)
    }

    pub fn position_utf16(&self, source: &[u8], index: usize) -> Position {
        self.position_general(source, index, |line| {
            line.chars()
                .map(|ch| if (ch as u32) < 0x10000 { 1 } else { 2 })
                .sum()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pos(line: u32, character: u32) -> Position {
        Position { line, character }
    }

    #[test]
    fn test_line_terminators() {
        let source = "a\r\nb\rc\nd\u{85}e\u{2028}f\u{2029}g".as_bytes();
        let locator = SourceLocator::new(source);
        assert_eq!(locator.line_count(), 7);
        let lines = ["a", "b", "c", "d", "e", "f", "g"]
            .iter()
            .map(|letter| {
                let offset = source.find(letter.as_bytes()).unwrap_or(usize::MAX);
                locator.position_utf8(source, offset).line
            })
            .collect::<Vec<_>>();
        assert_eq!(lines, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_columns() {
        let source = "x\n\u{3042}\u{1F600}y".as_bytes();
        let locator = SourceLocator::new(source);
        let y = source.len() - 1;
        assert_eq!(locator.position_utf8(source, y), pos(1, 7));
        assert_eq!(locator.position_utf16(source, y), pos(1, 3));
        assert_eq!(locator.position_utf8(source, source.len() + 10), pos(1, 8));
        assert_eq!(locator.position_utf8(source, 1), pos(0, 1));
    }
}
