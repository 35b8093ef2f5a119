//! Line index for byte offset to line/column conversion.
//!
//! Lines are 1-indexed and columns are 0-indexed character counts from the
//! start of the line, which makes a column equal to the width of the text
//! in front of it. `\n`, `\r\n` and a lone `\r` all terminate a line.

use memchr::memchr2_iter;

/// Precomputed line start offsets for a source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the first character of every line
    line_starts: Vec<u32>,
    /// Total source length in bytes
    len: u32,
}

impl LineIndex {
    /// Build the index for `source`.
    pub fn new(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut line_starts = Vec::with_capacity(bytes.len() / 32 + 1);
        line_starts.push(0);

        for pos in memchr2_iter(b'\n', b'\r', bytes) {
            // `\r\n` is a single terminator, counted at the `\n`.
            if bytes[pos] == b'\r' && bytes.get(pos + 1) == Some(&b'\n') {
                continue;
            }
            line_starts.push(pos as u32 + 1);
        }

        Self {
            line_starts,
            len: bytes.len() as u32,
        }
    }

    /// Number of lines (an empty source has one empty line)
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where 1-indexed `line` starts.
    ///
    /// Lines past the end clamp to the source length.
    #[inline]
    pub fn line_start(&self, line: u32) -> u32 {
        let idx = line.saturating_sub(1) as usize;
        self.line_starts.get(idx).copied().unwrap_or(self.len)
    }

    /// 1-indexed line containing `offset`.
    #[inline]
    pub fn line_of(&self, offset: u32) -> u32 {
        self.line_starts.partition_point(|&start| start <= offset) as u32
    }

    /// Line and character column of `offset` in `source`.
    ///
    /// `source` must be the text this index was built from.
    pub fn position(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_of(offset);
        let start = self.line_start(line) as usize;
        let end = (offset as usize).min(source.len());
        let column = source
            .get(start..end)
            .map_or(end.saturating_sub(start), |text| text.chars().count());
        (line, column as u32)
    }

    /// Text of 1-indexed `line` without its terminator.
    pub fn line_text<'s>(&self, source: &'s str, line: u32) -> &'s str {
        let start = self.line_start(line) as usize;
        let end = if (line as usize) < self.line_starts.len() {
            self.line_start(line + 1) as usize
        } else {
            source.len()
        };
        let text = source.get(start..end).unwrap_or("");
        text.trim_end_matches(['\n', '\r'])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_starts() {
        let index = LineIndex::new("a\nbc\r\nd\re");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_start(1), 0);
        assert_eq!(index.line_start(2), 2);
        assert_eq!(index.line_start(3), 6);
        assert_eq!(index.line_start(4), 8);
    }

    #[test]
    fn test_position() {
        let source = "<view>\n  <text/>\n</view>";
        let index = LineIndex::new(source);
        assert_eq!(index.position(source, 0), (1, 0));
        assert_eq!(index.position(source, 9), (2, 2));
        assert_eq!(index.position(source, 17), (3, 0));
    }

    #[test]
    fn test_position_counts_characters() {
        let source = "é <a>";
        let index = LineIndex::new(source);
        // `é` is two bytes but one column.
        assert_eq!(index.position(source, 3), (1, 2));
    }

    #[test]
    fn test_line_text() {
        let source = "one\r\ntwo\nthree";
        let index = LineIndex::new(source);
        assert_eq!(index.line_text(source, 1), "one");
        assert_eq!(index.line_text(source, 2), "two");
        assert_eq!(index.line_text(source, 3), "three");
    }
}
