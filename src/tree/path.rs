//! Dot-path parsing for variable references
//!
//! A reference like `{{ .user.name }}` names the path `["user", "name"]`. While
//! the user is still typing, the fragment after the opening dot is split into a
//! prefix path (whose children are offered) and a partial last segment (used to
//! filter those children).

use super::VariableLookup;
use std::fmt;

/// A fully typed dot-path such as `user.name`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DotPath {
    segments: Vec<String>,
}

impl DotPath {
    /// Splits `raw` on `.`; the empty string is the root path
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: split_segments(raw),
        }
    }

    /// Creates a path from already split segments
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// A partially typed path, as seen by the completion provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    /// Path whose children are completion candidates
    pub prefix: DotPath,
    /// In-progress last segment, matched as a case-sensitive prefix
    pub partial: String,
    /// Whether the fragment ended with a dot
    pub dot_ended: bool,
}

/// A key offered for completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The child key
    pub key: String,
    /// Text to insert at the cursor
    pub insert_text: String,
    /// Full path to the candidate, without empty segments
    pub full_path: DotPath,
}

impl PathQuery {
    /// Splits a typed fragment into prefix path and partial segment.
    ///
    /// - `"user."` gives prefix `user`, partial `""`
    /// - `"user.na"` gives prefix `user`, partial `"na"`
    /// - `""` gives the root prefix and an empty partial
    pub fn parse(raw: &str) -> Self {
        if let Some(prefix) = raw.strip_suffix('.') {
            return Self {
                prefix: DotPath::parse(prefix),
                partial: String::new(),
                dot_ended: true,
            };
        }

        match raw.rsplit_once('.') {
            Some((prefix, last)) => Self {
                prefix: DotPath::parse(prefix),
                partial: last.to_string(),
                dot_ended: false,
            },
            None => Self {
                prefix: DotPath::default(),
                partial: raw.to_string(),
                dot_ended: false,
            },
        }
    }

    /// Keys under the prefix path starting with the partial segment.
    ///
    /// The insert text is the whole key after a trailing dot, otherwise only
    /// the part of the key beyond what was already typed.
    pub fn candidates<L: VariableLookup + ?Sized>(&self, lookup: &L) -> Vec<Candidate> {
        lookup
            .sub_keys(self.prefix.segments())
            .into_iter()
            .filter(|key| key.starts_with(&self.partial))
            .map(|key| {
                let insert_text = if self.dot_ended {
                    key.clone()
                } else {
                    key[self.partial.len()..].to_string()
                };
                let full_path = DotPath::from_segments(
                    self.prefix
                        .segments()
                        .iter()
                        .filter(|segment| !segment.is_empty())
                        .cloned()
                        .chain(std::iter::once(key.clone()))
                        .collect(),
                );
                Candidate {
                    key,
                    insert_text,
                    full_path,
                }
            })
            .collect()
    }
}

fn split_segments(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        Vec::new()
    } else {
        raw.split('.').map(str::to_string).collect()
    }
}
