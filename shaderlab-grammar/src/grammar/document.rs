//! Document abstraction and position tracking
//!
//! The engine never owns document text. Everything it needs from the hosting
//! editor layer is captured by [`DocumentView`]: text retrieval by byte
//! range, conversion between byte offsets and line/column positions, and the
//! total length. [`SourceDocument`] is the plain-string implementation used
//! by tests and by hosts that already hold the full text.
//!
//! Positions are zero-based. Offsets are byte offsets; ranges are half-open.

use std::fmt;
use std::ops::Range as ByteRange;

/// A line:column position in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// A document range carrying both its byte span and its resolved positions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRange {
    pub span: ByteRange<usize>,
    pub start: Position,
    pub end: Position,
}

impl SourceRange {
    pub fn new(span: ByteRange<usize>, start: Position, end: Position) -> Self {
        Self { span, start, end }
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Read-only view of a document, as supplied by the hosting editor layer
pub trait DocumentView {
    /// Total length of the document text, in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The text covered by a half-open byte range.
    fn text_in(&self, span: ByteRange<usize>) -> &str;

    /// Convert a byte offset to a line/column position.
    fn position_at(&self, offset: usize) -> Position;

    /// Convert a line/column position back to a byte offset.
    fn offset_at(&self, position: Position) -> usize;

    /// Resolve a byte range to a [`SourceRange`] with positions attached.
    fn range_at(&self, span: ByteRange<usize>) -> SourceRange {
        SourceRange::new(
            span.clone(),
            self.position_at(span.start),
            self.position_at(span.end),
        )
    }
}

/// A [`DocumentView`] over an owned string, indexed by line starts
pub struct SourceDocument {
    text: String,
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl SourceDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (byte_pos, ch) in text.char_indices() {
            if ch == '\n' {
                line_starts.push(byte_pos + 1);
            }
        }
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

impl DocumentView for SourceDocument {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn text_in(&self, span: ByteRange<usize>) -> &str {
        &self.text[span]
    }

    fn position_at(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i - 1);
        Position::new(line, offset - self.line_starts[line])
    }

    fn offset_at(&self, position: Position) -> usize {
        match self.line_starts.get(position.line) {
            Some(start) => (start + position.column).min(self.text.len()),
            None => self.text.len(),
        }
    }
}
