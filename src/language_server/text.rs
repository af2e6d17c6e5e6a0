//! Document positions shared by the completion and hover providers.
//!
//! Positions follow LSP: zero-based lines and UTF-16 code unit columns.

/// Position in a text document (line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Zero-based line number
    pub line: usize,
    /// Zero-based UTF-16 offset in the line
    pub character: usize,
}

impl Position {
    /// Creates a new position
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// A range in a text document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// Start position of the range
    pub start: Position,
    /// End position of the range
    pub end: Position,
}

impl Range {
    /// Creates a new range
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Returns the text of line `line`, without its terminator
pub(crate) fn line_at(document: &str, line: usize) -> Option<&str> {
    document.lines().nth(line)
}

/// Converts a UTF-16 column into a byte offset, clamped to the line length
pub(crate) fn byte_offset(line: &str, character: usize) -> usize {
    let mut units = 0;
    for (index, ch) in line.char_indices() {
        if units >= character {
            return index;
        }
        units += ch.len_utf16();
    }
    line.len()
}

/// Converts a byte offset (on a char boundary) into a UTF-16 column
pub(crate) fn utf16_column(line: &str, byte: usize) -> usize {
    line[..byte].encode_utf16().count()
}
