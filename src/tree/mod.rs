//! Variable tree for placeholder resolution
//!
//! This module holds the parsed contents of `variables.json` and answers the two
//! queries the editor features need: which keys live under a dot-path, and which
//! value lives at a dot-path.
//!
//! # Example
//!
//! ```
//! use placeholder_vars::tree::VariableTree;
//!
//! let mut tree = VariableTree::new();
//! tree.load(r#"{"user": {"name": "Ada"}}"#).unwrap();
//!
//! assert_eq!(tree.sub_keys(&["user"]), vec!["name".to_string()]);
//! assert_eq!(tree.value_at(&["user", "name"]).unwrap(), "Ada");
//! ```

pub mod error;
pub mod path;

pub use error::ParseError;
pub use path::{Candidate, DotPath, PathQuery};

use serde_json::{Map, Value};

/// Read access to a tree of variables addressed by dot-paths.
///
/// Implemented by [`VariableTree`] and by the live store, so the completion
/// and hover providers never depend on how the tree is owned.
pub trait VariableLookup {
    /// Direct child keys of the node at `path`, or empty if the node is
    /// missing or not object-shaped.
    fn sub_keys<S: AsRef<str>>(&self, path: &[S]) -> Vec<String>;

    /// The value at `path` (leaf or subtree), cloned out of the tree.
    fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<Value>;

    /// Whether the node at `path` is object-shaped.
    fn is_object_at<S: AsRef<str>>(&self, path: &[S]) -> bool {
        matches!(self.lookup(path), Some(Value::Object(_)))
    }
}

/// In-memory tree parsed from a JSON document.
///
/// The root may have any JSON shape. Only objects are traversable; arrays and
/// scalars are leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableTree {
    root: Value,
}

impl VariableTree {
    /// Creates an empty tree (an object with no keys)
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Parses `text` into a new tree without touching any existing one
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let root: Value = serde_json::from_str(text)?;
        Ok(Self { root })
    }

    /// Replaces the whole tree with the parsed contents of `text`.
    ///
    /// On failure the tree is reset to empty and the previous contents are
    /// discarded.
    pub fn load(&mut self, text: &str) -> Result<(), ParseError> {
        match Self::parse(text) {
            Ok(tree) => {
                *self = tree;
                Ok(())
            }
            Err(e) => {
                self.clear();
                Err(e)
            }
        }
    }

    /// Resets the tree to an empty mapping
    pub fn clear(&mut self) {
        self.root = Value::Object(Map::new());
    }

    /// Returns the root value
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Returns true if the root is an object with no keys
    pub fn is_empty(&self) -> bool {
        matches!(&self.root, Value::Object(map) if map.is_empty())
    }

    /// Direct child keys of the object at `path`.
    ///
    /// Returns an empty vector when any segment fails to resolve, or when the
    /// node reached is not an object. Key order follows the underlying map.
    pub fn sub_keys<S: AsRef<str>>(&self, path: &[S]) -> Vec<String> {
        match self.value_at(path) {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// The value at `path`, or `None` if a segment is missing or a non-object
    /// is reached before the path is exhausted. The empty path is the root.
    pub fn value_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path {
            current = current.as_object()?.get(segment.as_ref())?;
        }
        Some(current)
    }

    /// Returns true if the node at `path` is object-shaped
    pub fn is_object_at<S: AsRef<str>>(&self, path: &[S]) -> bool {
        matches!(self.value_at(path), Some(Value::Object(_)))
    }
}

impl Default for VariableTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableLookup for VariableTree {
    fn sub_keys<S: AsRef<str>>(&self, path: &[S]) -> Vec<String> {
        VariableTree::sub_keys(self, path)
    }

    fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<Value> {
        self.value_at(path).cloned()
    }

    fn is_object_at<S: AsRef<str>>(&self, path: &[S]) -> bool {
        VariableTree::is_object_at(self, path)
    }
}
