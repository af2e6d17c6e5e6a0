//! Variables source handling
//!
//! Translates file-system notifications about the variables file into calls
//! on a [`SourceListener`]. The host decides when files change; this module
//! only decides what each kind of change means.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use placeholder_vars::source::{apply_event, variables_path, SourceEvent};
//! use placeholder_vars::store::VariableStore;
//!
//! let store = VariableStore::default();
//! let path = variables_path(Path::new("/path/to/workspace"), "variables.json");
//! let outcome = apply_event(SourceEvent::Changed, &path, &store);
//! println!("{}", outcome);
//! ```

pub mod loader;

pub use loader::{
    is_source_file, read_source, variables_path, SourceError, DEFAULT_VARIABLES_FILE,
};

use crate::store::SourceListener;
use std::fmt;
use std::path::Path;

/// Kind of change reported for the variables file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEvent {
    Created,
    Changed,
    Deleted,
}

/// Result of applying a source event
#[derive(Debug, Clone, PartialEq)]
pub enum ReloadOutcome {
    /// The source was parsed and the tree replaced
    Loaded,
    /// The source is gone and the tree was emptied
    Cleared,
    /// The source could not be read or parsed
    Failed(SourceError),
}

impl fmt::Display for ReloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReloadOutcome::Loaded => write!(f, "Variables loaded"),
            ReloadOutcome::Cleared => write!(f, "Variables cleared"),
            ReloadOutcome::Failed(err) => write!(f, "{}", err),
        }
    }
}

/// Applies `event` for the file at `path` to `listener`.
///
/// Created and Changed re-read the file; a file that has vanished in the
/// meantime counts as deleted. Deleted empties the tree.
pub fn apply_event<L: SourceListener + ?Sized>(
    event: SourceEvent,
    path: &Path,
    listener: &L,
) -> ReloadOutcome {
    match event {
        SourceEvent::Created | SourceEvent::Changed => match read_source(path) {
            Ok(Some(text)) => apply_text(&text, listener),
            Ok(None) => {
                listener.source_removed();
                ReloadOutcome::Cleared
            }
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                ReloadOutcome::Failed(e)
            }
        },
        SourceEvent::Deleted => {
            listener.source_removed();
            ReloadOutcome::Cleared
        }
    }
}

/// Hands already-read source text to `listener`
pub fn apply_text<L: SourceListener + ?Sized>(text: &str, listener: &L) -> ReloadOutcome {
    match listener.source_changed(text) {
        Ok(()) => ReloadOutcome::Loaded,
        Err(e) => ReloadOutcome::Failed(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ParseError;
    use std::sync::Mutex;

    /// Records every notification it receives
    #[derive(Default)]
    struct RecordingListener {
        calls: Mutex<Vec<String>>,
    }

    impl SourceListener for RecordingListener {
        fn source_changed(&self, text: &str) -> Result<(), ParseError> {
            self.calls.lock().unwrap().push(format!("changed:{}", text));
            serde_json::from_str::<serde_json::Value>(text)
                .map(|_| ())
                .map_err(ParseError::from)
        }

        fn source_removed(&self) {
            self.calls.lock().unwrap().push("removed".to_string());
        }
    }

    #[test]
    fn test_deleted_removes_without_reading() {
        let listener = RecordingListener::default();
        let outcome = apply_event(
            SourceEvent::Deleted,
            Path::new("/definitely/not/here.json"),
            &listener,
        );

        assert_eq!(outcome, ReloadOutcome::Cleared);
        assert_eq!(*listener.calls.lock().unwrap(), vec!["removed".to_string()]);
    }

    #[test]
    fn test_changed_on_missing_file_counts_as_removed() {
        let listener = RecordingListener::default();
        let outcome = apply_event(
            SourceEvent::Changed,
            Path::new("/definitely/not/here.json"),
            &listener,
        );

        assert_eq!(outcome, ReloadOutcome::Cleared);
    }

    #[test]
    fn test_apply_text_forwards_text() {
        let listener = RecordingListener::default();
        let outcome = apply_text(r#"{"a": 1}"#, &listener);

        assert_eq!(outcome, ReloadOutcome::Loaded);
        assert_eq!(
            *listener.calls.lock().unwrap(),
            vec![r#"changed:{"a": 1}"#.to_string()]
        );
    }

    #[test]
    fn test_apply_text_reports_parse_failure() {
        let listener = RecordingListener::default();
        let outcome = apply_text("{", &listener);

        assert!(matches!(outcome, ReloadOutcome::Failed(SourceError::Parse(_))));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(ReloadOutcome::Loaded.to_string(), "Variables loaded");
        assert_eq!(ReloadOutcome::Cleared.to_string(), "Variables cleared");
    }
}
