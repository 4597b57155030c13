//! Line table for generated source text.
//!
//! Offsets are UTF-8 byte offsets ([`TextSize`]). Decompiler regions are expressed as 1-based
//! line and column pairs where columns count characters; [`SourcePosition`] is that form.

pub use text_size::{TextRange, TextSize};

/// 1-based line and character column.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Pre-computed line start offsets for a particular text snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    line_ends: Vec<TextSize>,
    text_len: TextSize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![TextSize::from(0)];
        let mut line_ends = Vec::new();

        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    line_ends.push(TextSize::from(i as u32));
                    line_starts.push(TextSize::from((i + 1) as u32));
                    i += 1;
                }
                b'\r' => {
                    let width = if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                    line_ends.push(TextSize::from(i as u32));
                    line_starts.push(TextSize::from((i + width) as u32));
                    i += width;
                }
                _ => i += 1,
            }
        }
        line_ends.push(TextSize::from(text.len() as u32));

        Self {
            line_starts,
            line_ends,
            text_len: TextSize::from(text.len() as u32),
        }
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.text_len
    }

    #[inline]
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Zero-based line containing `offset`; offsets past the end clamp to the last line.
    pub fn line_of(&self, offset: TextSize) -> u32 {
        let offset = offset.min(self.text_len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert.saturating_sub(1),
        };
        line as u32
    }

    /// Byte offset to a 1-based line / character column.
    ///
    /// `text` must be the snapshot this index was built from.
    pub fn position(&self, text: &str, offset: TextSize) -> SourcePosition {
        debug_assert_eq!(TextSize::from(text.len() as u32), self.text_len);
        let line = self.line_of(offset) as usize;
        let start = u32::from(self.line_starts[line]) as usize;
        let end = u32::from(offset.min(self.line_ends[line])) as usize;
        let column = text
            .get(start..end)
            .map_or(0, |prefix| prefix.chars().count() as u32);
        SourcePosition {
            line: line as u32 + 1,
            column: column + 1,
        }
    }

    /// 1-based line / character column to a byte offset.
    ///
    /// Returns `None` for line or column `0`, a line past the end, or a column more than one past
    /// the last character of the line (one past is the end-of-line position).
    pub fn offset(&self, text: &str, position: SourcePosition) -> Option<TextSize> {
        debug_assert_eq!(TextSize::from(text.len() as u32), self.text_len);
        let line = position.line.checked_sub(1)? as usize;
        let column = position.column.checked_sub(1)? as usize;
        let start = *self.line_starts.get(line)?;
        let end = *self.line_ends.get(line)?;
        let line_text = text.get(u32::from(start) as usize..u32::from(end) as usize)?;

        match line_text.char_indices().nth(column) {
            Some((byte_idx, _)) => Some(start + TextSize::from(byte_idx as u32)),
            None if line_text.chars().count() == column => Some(end),
            None => None,
        }
    }

    /// Converts a 1-based region to a byte range. `None` if either end is invalid or the range is
    /// reversed.
    pub fn range(
        &self,
        text: &str,
        start: SourcePosition,
        end: SourcePosition,
    ) -> Option<TextRange> {
        let start = self.offset(text, start)?;
        let end = self.offset(text, end)?;
        (start <= end).then(|| TextRange::new(start, end))
    }
}
