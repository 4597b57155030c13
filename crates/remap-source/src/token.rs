use std::cmp::Ordering;

use remap_core::{TextRange, TextSize};

/// A span of source text bound to a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    range: TextRange,
}

impl Token {
    pub fn new(range: TextRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn start(&self) -> TextSize {
        self.range.start()
    }

    pub fn end(&self) -> TextSize {
        self.range.end()
    }

    /// Half-open: the end offset is outside the token.
    pub fn contains(&self, offset: TextSize) -> bool {
        self.range.contains(offset)
    }

    pub fn overlaps(&self, other: &Token) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }
}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.start(), self.end()).cmp(&(other.start(), other.end()))
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
