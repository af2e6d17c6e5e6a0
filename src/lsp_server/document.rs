//! Open document tracking for the placeholder language server
//!
//! The server syncs full document text, so every change replaces the stored
//! content. Stale versions from out-of-order notifications are ignored.

use dashmap::DashMap;
use lsp_types::Url;
use std::sync::Arc;

/// Error types for document operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Document was never opened or has been closed
    NotOpen(String),
    /// Change carries a version older than the stored one
    StaleVersion { stored: i32, received: i32 },
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::NotOpen(uri) => write!(f, "Document not open: {}", uri),
            DocumentError::StaleVersion { stored, received } => write!(
                f,
                "Ignoring change with version {} (current version is {})",
                received, stored
            ),
        }
    }
}

impl std::error::Error for DocumentError {}

/// Text and version of one open document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDocument {
    pub text: String,
    pub version: i32,
}

/// Concurrent map of open documents keyed by URI
#[derive(Debug, Clone, Default)]
pub struct DocumentManager {
    documents: Arc<DashMap<String, OpenDocument>>,
}

impl DocumentManager {
    /// Creates an empty manager
    ///
    /// # Examples
    ///
    /// ```
    /// use placeholder_vars::lsp_server::document::DocumentManager;
    ///
    /// let manager = DocumentManager::new();
    /// assert!(manager.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map key for `uri`.
    ///
    /// File URIs are keyed by their path with forward slashes so the same file
    /// reached through differently escaped URIs shares one entry.
    fn key(uri: &Url) -> String {
        if uri.scheme() == "file" {
            if let Ok(path) = uri.to_file_path() {
                return format!("file://{}", path.to_string_lossy().replace('\\', "/"));
            }
        }
        uri.as_str().to_string()
    }

    /// Records a newly opened document, replacing any previous entry
    pub fn open(&self, uri: &Url, text: String, version: i32) {
        self.documents
            .insert(Self::key(uri), OpenDocument { text, version });
    }

    /// Replaces the text of an open document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::NotOpen` if the document is not tracked and
    /// `DocumentError::StaleVersion` if `version` is older than the stored one.
    pub fn update(&self, uri: &Url, text: String, version: i32) -> Result<(), DocumentError> {
        let mut entry = self
            .documents
            .get_mut(&Self::key(uri))
            .ok_or_else(|| DocumentError::NotOpen(uri.to_string()))?;

        if version < entry.version {
            return Err(DocumentError::StaleVersion {
                stored: entry.version,
                received: version,
            });
        }

        entry.text = text;
        entry.version = version;
        Ok(())
    }

    /// Returns the current text of a document
    ///
    /// # Examples
    ///
    /// ```
    /// use placeholder_vars::lsp_server::document::DocumentManager;
    /// use lsp_types::Url;
    ///
    /// let manager = DocumentManager::new();
    /// let uri = Url::parse("file:///notes/release.md").unwrap();
    /// manager.open(&uri, "Deploy {{ .env }}".to_string(), 1);
    /// assert_eq!(manager.text(&uri).as_deref(), Some("Deploy {{ .env }}"));
    /// ```
    pub fn text(&self, uri: &Url) -> Option<String> {
        self.documents
            .get(&Self::key(uri))
            .map(|entry| entry.text.clone())
    }

    /// Returns the stored version of a document
    pub fn version(&self, uri: &Url) -> Option<i32> {
        self.documents.get(&Self::key(uri)).map(|entry| entry.version)
    }

    /// Forgets a closed document, returning its last state
    pub fn close(&self, uri: &Url) -> Option<OpenDocument> {
        self.documents
            .remove(&Self::key(uri))
            .map(|(_, document)| document)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&self) {
        self.documents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///docs/{}", name)).unwrap()
    }

    #[test]
    fn test_open_and_read() {
        let manager = DocumentManager::new();
        manager.open(&uri("a.md"), "{{ .user }}".to_string(), 1);

        assert_eq!(manager.text(&uri("a.md")).as_deref(), Some("{{ .user }}"));
        assert_eq!(manager.version(&uri("a.md")), Some(1));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_reopen_replaces() {
        let manager = DocumentManager::new();
        manager.open(&uri("a.md"), "old".to_string(), 3);
        manager.open(&uri("a.md"), "new".to_string(), 1);

        assert_eq!(manager.text(&uri("a.md")).as_deref(), Some("new"));
        assert_eq!(manager.version(&uri("a.md")), Some(1));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_update_open_document() {
        let manager = DocumentManager::new();
        manager.open(&uri("a.md"), "v1".to_string(), 1);

        assert!(manager.update(&uri("a.md"), "v2".to_string(), 2).is_ok());
        assert_eq!(manager.text(&uri("a.md")).as_deref(), Some("v2"));
        assert_eq!(manager.version(&uri("a.md")), Some(2));
    }

    #[test]
    fn test_update_not_open() {
        let manager = DocumentManager::new();
        let result = manager.update(&uri("missing.md"), "text".to_string(), 1);

        assert!(matches!(result, Err(DocumentError::NotOpen(_))));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_update_stale_version_is_rejected() {
        let manager = DocumentManager::new();
        manager.open(&uri("a.md"), "v5".to_string(), 5);

        let result = manager.update(&uri("a.md"), "v4".to_string(), 4);
        assert_eq!(
            result,
            Err(DocumentError::StaleVersion {
                stored: 5,
                received: 4
            })
        );
        assert_eq!(manager.text(&uri("a.md")).as_deref(), Some("v5"));
    }

    #[test]
    fn test_close() {
        let manager = DocumentManager::new();
        manager.open(&uri("a.md"), "text".to_string(), 1);

        let closed = manager.close(&uri("a.md")).unwrap();
        assert_eq!(closed.text, "text");
        assert!(manager.close(&uri("a.md")).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_escaped_uri_shares_entry() {
        let manager = DocumentManager::new();
        let plain = Url::parse("file:///docs/my notes.md").unwrap();
        let escaped = Url::parse("file:///docs/my%20notes.md").unwrap();

        manager.open(&plain, "text".to_string(), 1);
        assert_eq!(manager.text(&escaped).as_deref(), Some("text"));
    }

    #[test]
    fn test_non_file_uri() {
        let manager = DocumentManager::new();
        let untitled = Url::parse("untitled:Untitled-1").unwrap();

        manager.open(&untitled, "{{ .".to_string(), 1);
        assert_eq!(manager.text(&untitled).as_deref(), Some("{{ ."));
    }

    #[test]
    fn test_clear() {
        let manager = DocumentManager::new();
        manager.open(&uri("a.md"), "a".to_string(), 1);
        manager.open(&uri("b.txt"), "b".to_string(), 1);

        manager.clear();
        assert!(manager.is_empty());
    }

    #[test]
    fn test_concurrent_updates() {
        let manager = Arc::new(DocumentManager::new());
        manager.open(&uri("shared.md"), "initial".to_string(), 0);

        let handles: Vec<_> = (1..=8)
            .map(|version| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    let _ = manager.update(&uri("shared.md"), format!("v{}", version), version);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(manager.version(&uri("shared.md")), Some(8));
        assert_eq!(manager.text(&uri("shared.md")).as_deref(), Some("v8"));
    }
}
