//! Variable completion provider
//!
//! Completions are offered while the user types a reference such as
//! `{{ .user.na`: the fragment after the opening dot is split into a prefix
//! path and a partial segment, and the children of the prefix path that start
//! with the partial segment become completion items.

use super::text::{byte_offset, line_at, Position};
use crate::config::{CompletionDetail, PlaceholderConfig};
use crate::tree::{PathQuery, VariableLookup};
use once_cell::sync::Lazy;
use regex::Regex;

/// An opening delimiter, a dot, then a fragment with no braces up to the cursor
static OPEN_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<open>\{\{\{?)\s*\.(?P<path>[^{}]*)$")
        .expect("open reference pattern is valid")
});

/// Represents a completion item to be shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionItem {
    /// The key being offered
    pub label: String,

    /// Whether the key holds an object or a plain value
    pub kind: CompletionKind,

    /// Resolved value or full path, depending on configuration
    pub detail: Option<String>,

    /// The text to insert (only the untyped part of the key after a partial segment)
    pub insert_text: String,
}

/// The kind of completion item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// Key whose value is an object, so it can be descended into
    Object,
    /// Key whose value is a scalar or an array
    Value,
}

/// Returns the dot-path fragment being typed at the end of `line_prefix`
///
/// `None` means the cursor is not inside an open reference.
pub fn reference_fragment<'a>(line_prefix: &'a str, config: &PlaceholderConfig) -> Option<&'a str> {
    let captures = OPEN_REFERENCE.captures(line_prefix)?;
    let open = captures.name("open")?.as_str();
    if !config.delimiter.accepts_opening(open) {
        return None;
    }
    Some(captures.name("path")?.as_str().trim())
}

/// Provides completion suggestions for variables at the given position
///
/// # Arguments
/// * `position` - The cursor position in the document
/// * `document` - The full text of the document
/// * `lookup` - The variable tree to complete against
/// * `config` - Delimiter and detail settings
///
/// # Returns
/// Completion items sorted by label, or empty if the cursor is not inside an
/// open reference
///
/// # Examples
/// ```
/// use placeholder_vars::config::PlaceholderConfig;
/// use placeholder_vars::language_server::{provide_completions, Position};
/// use placeholder_vars::tree::VariableTree;
///
/// let tree = VariableTree::parse(r#"{"user": {"name": "Ada"}}"#).unwrap();
/// let doc = "Hello {{ .user.na";
/// let items = provide_completions(Position::new(0, 17), doc, &tree, &PlaceholderConfig::default());
///
/// assert_eq!(items[0].label, "name");
/// assert_eq!(items[0].insert_text, "me");
/// ```
pub fn provide_completions<L: VariableLookup + ?Sized>(
    position: Position,
    document: &str,
    lookup: &L,
    config: &PlaceholderConfig,
) -> Vec<CompletionItem> {
    let line = match line_at(document, position.line) {
        Some(line) => line,
        None => return Vec::new(),
    };
    let prefix = &line[..byte_offset(line, position.character)];

    let fragment = match reference_fragment(prefix, config) {
        Some(fragment) => fragment,
        None => return Vec::new(),
    };

    let query = PathQuery::parse(fragment);
    let mut items: Vec<CompletionItem> = query
        .candidates(lookup)
        .into_iter()
        .map(|candidate| {
            let kind = if lookup.is_object_at(candidate.full_path.segments()) {
                CompletionKind::Object
            } else {
                CompletionKind::Value
            };
            let detail = match config.completion_detail {
                CompletionDetail::Value => lookup
                    .lookup(candidate.full_path.segments())
                    .map(|v| format!("Value: {}", v)),
                CompletionDetail::Path => Some(format!("Path: {}", candidate.full_path)),
                CompletionDetail::None => None,
            };
            CompletionItem {
                label: candidate.key,
                kind,
                detail,
                insert_text: candidate.insert_text,
            }
        })
        .collect();

    items.sort_by(|a, b| a.label.cmp(&b.label));
    items
}
