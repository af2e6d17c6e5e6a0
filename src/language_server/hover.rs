//! Variable hover provider
//!
//! Shows the value behind a complete reference such as `{{ .user.name }}` when
//! the cursor rests on it.

use super::text::{byte_offset, line_at, utf16_column, Position, Range};
use crate::config::PlaceholderConfig;
use crate::tree::{DotPath, VariableLookup};
use once_cell::sync::Lazy;
use regex::Regex;

/// A whitespace-tolerant closed reference
static CLOSED_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<open>\{\{\{?)\s*\.(?P<path>[^{}]*?)\s*(?P<close>\}\}\}?)")
        .expect("closed reference pattern is valid")
});

/// Represents hover information to display to the user
#[derive(Debug, Clone, PartialEq)]
pub struct Hover {
    /// Markdown content of the hover tooltip
    pub contents: String,

    /// Optional range in the document that this hover applies to
    pub range: Option<Range>,
}

impl Hover {
    /// Creates a new hover with content
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            range: None,
        }
    }

    /// Creates a new hover with content and range
    pub fn with_range(contents: impl Into<String>, range: Range) -> Self {
        Self {
            contents: contents.into(),
            range: Some(range),
        }
    }
}

/// Provides hover information for the reference at the given position
///
/// # Returns
/// Hover information if the cursor is over a reference whose path resolves,
/// None otherwise
///
/// # Examples
/// ```
/// use placeholder_vars::config::PlaceholderConfig;
/// use placeholder_vars::language_server::{provide_hover, Position};
/// use placeholder_vars::tree::VariableTree;
///
/// let tree = VariableTree::parse(r#"{"env": "prod"}"#).unwrap();
/// let doc = "Deploying to {{ .env }}";
/// let hover = provide_hover(Position::new(0, 18), doc, &tree, &PlaceholderConfig::default());
///
/// assert!(hover.unwrap().contents.contains("Value: \"prod\""));
/// ```
pub fn provide_hover<L: VariableLookup + ?Sized>(
    position: Position,
    document: &str,
    lookup: &L,
    config: &PlaceholderConfig,
) -> Option<Hover> {
    let (path, range) = find_reference_at_position(position, document, config)?;

    let value = lookup.lookup(DotPath::parse(&path).segments())?;
    let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());

    Some(Hover::with_range(format_hover_contents(&path, &pretty), range))
}

/// Finds the reference under the cursor.
///
/// Returns the raw dot-path (without the leading dot) and its range.
fn find_reference_at_position(
    position: Position,
    document: &str,
    config: &PlaceholderConfig,
) -> Option<(String, Range)> {
    let line = line_at(document, position.line)?;
    let cursor = byte_offset(line, position.character);

    CLOSED_REFERENCE
        .captures_iter(line)
        .filter(|captures| match (captures.name("open"), captures.name("close")) {
            // Closing braces must balance the opening ones
            (Some(open), Some(close)) => {
                open.len() == close.len()
                    && config.delimiter.accepts_opening(open.as_str())
                    && config.delimiter.accepts_closing(close.as_str())
            }
            _ => false,
        })
        .find_map(|captures| {
            let whole = captures.get(0)?;
            if cursor < whole.start() || cursor > whole.end() {
                return None;
            }
            let path = captures.name("path")?.as_str().to_string();
            let range = Range::new(
                Position::new(position.line, utf16_column(line, whole.start())),
                Position::new(position.line, utf16_column(line, whole.end())),
            );
            Some((path, range))
        })
}

fn format_hover_contents(path: &str, pretty_value: &str) -> String {
    format!("```json\nPath: {}\nValue: {}\n```", path, pretty_value)
}
