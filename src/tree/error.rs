//! Error type for loading a variable tree.

use std::fmt;

/// The variables source could not be parsed as JSON.
///
/// Carries the parser message and the 1-based location the parser reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human readable description from the JSON parser
    pub message: String,
    /// Line number in the source (1-based, 0 if unknown)
    pub line: usize,
    /// Column number in the source (1-based, 0 if unknown)
    pub column: usize,
}

impl ParseError {
    /// Creates a parse error without location information
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: 0,
            column: 0,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "Invalid JSON at line {}, column {}: {}",
                self.line, self.column, self.message
            )
        } else {
            write!(f, "Invalid JSON: {}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}
