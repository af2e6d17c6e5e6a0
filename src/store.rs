//! Live variable store shared between the file watcher and the query handlers
//!
//! The store owns the current [`VariableTree`] snapshot. Writers replace the
//! snapshot wholesale; readers clone the `Arc` and traverse a tree that is never
//! mutated afterwards, so a reload can never be observed half-applied.

use crate::tree::{ParseError, VariableLookup, VariableTree};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// What happens to the current tree when the source fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseFailurePolicy {
    /// Replace the tree with an empty one
    #[default]
    Clear,
    /// Keep serving the last tree that parsed successfully
    KeepLastGood,
}

/// Receives notifications that the variables source changed or disappeared.
pub trait SourceListener {
    /// The source now contains `text`
    fn source_changed(&self, text: &str) -> Result<(), ParseError>;

    /// The source no longer exists
    fn source_removed(&self);
}

/// Thread-safe owner of the current variable tree.
#[derive(Debug)]
pub struct VariableStore {
    current: RwLock<Arc<VariableTree>>,
    policy: RwLock<ParseFailurePolicy>,
}

impl VariableStore {
    /// Creates a store holding an empty tree
    pub fn new(policy: ParseFailurePolicy) -> Self {
        Self {
            current: RwLock::new(Arc::new(VariableTree::new())),
            policy: RwLock::new(policy),
        }
    }

    /// Returns the current tree snapshot
    pub fn snapshot(&self) -> Arc<VariableTree> {
        Arc::clone(&self.read_current())
    }

    /// Replaces the current tree with `tree`
    pub fn replace(&self, tree: VariableTree) {
        *self.write_current() = Arc::new(tree);
    }

    /// Resets the store to an empty tree
    pub fn clear(&self) {
        self.replace(VariableTree::new());
    }

    pub fn policy(&self) -> ParseFailurePolicy {
        *self
            .policy
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_policy(&self, policy: ParseFailurePolicy) {
        *self
            .policy
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = policy;
    }

    // A poisoned lock still guards a complete snapshot, so it is safe to reuse.
    fn read_current(&self) -> RwLockReadGuard<'_, Arc<VariableTree>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_current(&self) -> RwLockWriteGuard<'_, Arc<VariableTree>> {
        self.current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new(ParseFailurePolicy::default())
    }
}

impl SourceListener for VariableStore {
    fn source_changed(&self, text: &str) -> Result<(), ParseError> {
        match VariableTree::parse(text) {
            Ok(tree) => {
                self.replace(tree);
                Ok(())
            }
            Err(e) => {
                match self.policy() {
                    ParseFailurePolicy::Clear => {
                        log::warn!("Failed to parse variables, clearing tree: {}", e);
                        self.clear();
                    }
                    ParseFailurePolicy::KeepLastGood => {
                        log::warn!("Failed to parse variables, keeping previous tree: {}", e);
                    }
                }
                Err(e)
            }
        }
    }

    fn source_removed(&self) {
        log::info!("Variables source removed, clearing tree");
        self.clear();
    }
}

impl VariableLookup for VariableStore {
    fn sub_keys<S: AsRef<str>>(&self, path: &[S]) -> Vec<String> {
        self.snapshot().sub_keys(path)
    }

    fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<Value> {
        self.snapshot().value_at(path).cloned()
    }

    fn is_object_at<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.snapshot().is_object_at(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    const SAMPLE: &str = r#"{"user":{"name":"Ada","age":37},"env":"prod"}"#;

    #[test]
    fn test_new_store_is_empty() {
        let store = VariableStore::default();
        assert!(store.snapshot().is_empty());
        assert_eq!(store.policy(), ParseFailurePolicy::Clear);
    }

    #[test]
    fn test_source_changed_swaps_tree() {
        let store = VariableStore::default();
        store.source_changed(SAMPLE).unwrap();

        assert_eq!(store.lookup(&["user", "name"]), Some(json!("Ada")));
    }

    #[test]
    fn test_is_object_at_follows_snapshot() {
        let store = VariableStore::default();
        store.source_changed(SAMPLE).unwrap();

        assert!(store.is_object_at(&["user"]));
        assert!(!store.is_object_at(&["env"]));
        assert!(!store.is_object_at(&["missing"]));

        store.source_removed();
        assert!(!store.is_object_at(&["user"]));
    }

    #[test]
    fn test_parse_failure_clears_by_default() {
        let store = VariableStore::default();
        store.source_changed(SAMPLE).unwrap();

        assert!(store.source_changed("{ broken").is_err());
        assert!(store.snapshot().is_empty());
        assert_eq!(store.lookup(&["env"]), None);
    }

    #[test]
    fn test_parse_failure_keeps_last_good() {
        let store = VariableStore::new(ParseFailurePolicy::KeepLastGood);
        store.source_changed(SAMPLE).unwrap();

        assert!(store.source_changed("{ broken").is_err());
        assert_eq!(store.lookup(&["env"]), Some(json!("prod")));
    }

    #[test]
    fn test_set_policy_applies_to_next_failure() {
        let store = VariableStore::default();
        store.set_policy(ParseFailurePolicy::KeepLastGood);
        store.source_changed(SAMPLE).unwrap();
        let _ = store.source_changed("nope");

        assert!(!store.snapshot().is_empty());
    }

    #[test]
    fn test_source_removed_clears() {
        let store = VariableStore::default();
        store.source_changed(SAMPLE).unwrap();
        store.source_removed();

        assert!(store.sub_keys::<&str>(&[]).is_empty());
        assert_eq!(store.lookup(&["user"]), None);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_reload() {
        let store = VariableStore::default();
        store.source_changed(SAMPLE).unwrap();
        let before = store.snapshot();

        store.source_changed(r#"{"other": true}"#).unwrap();

        assert_eq!(before.value_at(&["env"]), Some(&json!("prod")));
        assert_eq!(store.lookup(&["env"]), None);
    }

    #[test]
    fn test_concurrent_reload_and_read() {
        let store = Arc::new(VariableStore::default());
        let mut handles = vec![];

        for i in 0..5 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store
                    .source_changed(&format!(r#"{{"n": {}, "nested": {{"n": {}}}}}"#, i, i))
                    .unwrap();
            }));
        }

        for _ in 0..5 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                let snapshot = store.snapshot();
                // Either empty or a complete tree, never a mix
                if let Some(n) = snapshot.value_at(&["n"]) {
                    assert_eq!(snapshot.value_at(&["nested", "n"]), Some(n));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.sub_keys::<&str>(&[]).len(), 2);
    }

    #[test]
    fn test_policy_deserializes_from_kebab_case() {
        let policy: ParseFailurePolicy = serde_json::from_value(json!("keep-last-good")).unwrap();
        assert_eq!(policy, ParseFailurePolicy::KeepLastGood);
    }
}
