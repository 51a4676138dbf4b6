//! Source positions and spans
//!
//! Every token, AST node and error carries a [`Span`] so diagnostics can
//! point at the exact bytes that caused them. Offsets are byte offsets into
//! the source text; lines and columns are 1-based, with columns counted in
//! characters.

use std::fmt;

/// A point in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// The position reached after scanning `text` starting here.
    pub fn advanced_over(self, text: &str) -> Self {
        let mut pos = self;
        for ch in text.chars() {
            pos.offset += ch.len_utf8();
            if ch == '\n' {
                pos.line += 1;
                pos.column = 1;
            } else {
                pos.column += 1;
            }
        }
        pos
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A region of source text: where it starts and how many bytes it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: Position, len: usize) -> Self {
        Self {
            offset: start.offset,
            line: start.line,
            column: start.column,
            len,
        }
    }

    pub fn start(&self) -> Position {
        Position::new(self.offset, self.line, self.column)
    }

    /// Byte offset one past the last byte covered.
    pub fn end_offset(&self) -> usize {
        self.offset + self.len
    }

    /// Span from the start of `self` through the end of `other`.
    pub fn to(self, other: Span) -> Span {
        if other.end_offset() <= self.offset {
            return self;
        }
        Span {
            len: other.end_offset().max(self.end_offset()) - self.offset,
            ..self
        }
    }

    /// Source text covered by this span.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source
            .get(self.offset..self.end_offset())
            .unwrap_or_default()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
