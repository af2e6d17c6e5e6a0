//! LSP Backend Implementation for the placeholder variables language server
//!
//! This module implements the Language Server Protocol backend using tower-lsp.
//! It owns the variable store, keeps it in sync with the variables file and
//! answers completion and hover requests for open documents.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionItem as LspCompletionItem, CompletionItemKind, CompletionOptions, CompletionParams,
    CompletionResponse, DidChangeConfigurationParams, DidChangeTextDocumentParams,
    DidChangeWatchedFilesParams, DidChangeWatchedFilesRegistrationOptions,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, DidSaveTextDocumentParams,
    FileChangeType, FileSystemWatcher, GlobPattern, Hover as LspHover, HoverContents, HoverParams,
    HoverProviderCapability, InitializeParams, InitializeResult, InitializedParams, MarkupContent,
    MarkupKind, MessageType, Position as LspPosition, Range as LspRange, Registration,
    SaveOptions, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextDocumentSyncOptions, TextDocumentSyncSaveOptions, Unregistration,
};
use tower_lsp::{Client, LanguageServer};

use super::document::{DocumentError, DocumentManager};
use crate::config::{load_config, PlaceholderConfig};
use crate::language_server::{completion, hover, Position, Range};
use crate::source::{self, is_source_file, variables_path, ReloadOutcome, SourceEvent};
use crate::store::VariableStore;

/// Registration id of the variables file watcher
const WATCHER_REGISTRATION_ID: &str = "placeholder-vars-watcher";

const DID_CHANGE_WATCHED_FILES: &str = "workspace/didChangeWatchedFiles";

/// LSP Backend for placeholder variables
///
/// Serves completions and hovers for `{{ .path }}` references in Markdown and
/// plain-text documents, backed by the JSON variables file in the workspace
/// root.
#[derive(Debug)]
pub struct Backend {
    /// LSP client for sending notifications and requests to the editor
    client: Client,

    /// Document manager for tracking open files
    documents: Arc<DocumentManager>,

    /// Current variable tree
    store: Arc<VariableStore>,

    /// Settings received from the editor
    config: Arc<RwLock<PlaceholderConfig>>,

    /// Workspace root the variables file is resolved against
    workspace_root: Arc<RwLock<Option<PathBuf>>>,

    /// Whether the client accepts dynamic watcher registration
    dynamic_watch: AtomicBool,
}

impl Backend {
    /// Creates a new Backend instance
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use placeholder_vars::lsp_server::backend::Backend;
    ///
    /// let (service, socket) = tower_lsp::LspService::new(Backend::new);
    /// ```
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: Arc::new(DocumentManager::new()),
            store: Arc::new(VariableStore::default()),
            config: Arc::new(RwLock::new(PlaceholderConfig::default())),
            workspace_root: Arc::new(RwLock::new(None)),
            dynamic_watch: AtomicBool::new(false),
        }
    }

    /// Logs to stderr and mirrors the message to the editor log
    async fn log_message(&self, typ: MessageType, message: impl std::fmt::Display) {
        let message = message.to_string();
        match typ {
            MessageType::ERROR => log::error!("{}", message),
            MessageType::WARNING => log::warn!("{}", message),
            _ => log::info!("{}", message),
        }
        self.client.log_message(typ, message).await;
    }

    async fn log_info(&self, message: impl std::fmt::Display) {
        self.log_message(MessageType::INFO, message).await;
    }

    async fn log_warn(&self, message: impl std::fmt::Display) {
        self.log_message(MessageType::WARNING, message).await;
    }

    async fn log_error(&self, message: impl std::fmt::Display) {
        self.log_message(MessageType::ERROR, message).await;
    }

    /// Returns a copy of the current configuration
    fn config(&self) -> PlaceholderConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_config(&self, config: PlaceholderConfig) {
        self.store.set_policy(config.on_parse_error);
        match self.config.write() {
            Ok(mut current) => *current = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }

    fn set_workspace_root(&self, root: PathBuf) {
        match self.workspace_root.write() {
            Ok(mut current) => *current = Some(root),
            Err(poisoned) => *poisoned.into_inner() = Some(root),
        }
    }

    /// Absolute path of the variables file, if the workspace root is known
    fn variables_path(&self) -> Option<PathBuf> {
        let root = match self.workspace_root.read() {
            Ok(root) => root.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }?;
        Some(variables_path(&root, &self.config().variables_file))
    }

    /// Applies `event` to the variables file and reports the outcome
    async fn reload(&self, event: SourceEvent) {
        let path = match self.variables_path() {
            Some(path) => path,
            None => {
                self.log_warn("No workspace root, variables file not loaded")
                    .await;
                return;
            }
        };

        let outcome = source::apply_event(event, &path, self.store.as_ref());
        self.report(&path, outcome).await;
    }

    async fn report(&self, path: &Path, outcome: ReloadOutcome) {
        match outcome {
            ReloadOutcome::Loaded => {
                self.log_info(format!("Loaded variables from {}", path.display()))
                    .await
            }
            ReloadOutcome::Cleared => {
                self.log_info(format!(
                    "No variables at {}, variables cleared",
                    path.display()
                ))
                .await
            }
            ReloadOutcome::Failed(e) => {
                self.log_warn(format!("Failed to load {}: {}", path.display(), e))
                    .await
            }
        }
    }

    /// Asks the client to watch the configured variables file
    async fn register_watcher(&self) {
        if !self.dynamic_watch.load(Ordering::SeqCst) {
            self.log_info("Client cannot register file watchers, relying on didSave")
                .await;
            return;
        }

        let pattern = format!("**/{}", self.config().variables_file);
        let options = DidChangeWatchedFilesRegistrationOptions {
            watchers: vec![FileSystemWatcher {
                glob_pattern: GlobPattern::String(pattern.clone()),
                kind: None,
            }],
        };
        let registration = Registration {
            id: WATCHER_REGISTRATION_ID.to_string(),
            method: DID_CHANGE_WATCHED_FILES.to_string(),
            register_options: serde_json::to_value(options).ok(),
        };

        match self.client.register_capability(vec![registration]).await {
            Ok(()) => self.log_info(format!("Watching {}", pattern)).await,
            Err(e) => {
                self.log_warn(format!("Failed to register watcher for {}: {}", pattern, e))
                    .await
            }
        }
    }

    async fn unregister_watcher(&self) {
        if !self.dynamic_watch.load(Ordering::SeqCst) {
            return;
        }

        let unregistration = Unregistration {
            id: WATCHER_REGISTRATION_ID.to_string(),
            method: DID_CHANGE_WATCHED_FILES.to_string(),
        };
        if let Err(e) = self
            .client
            .unregister_capability(vec![unregistration])
            .await
        {
            self.log_warn(format!("Failed to unregister watcher: {}", e))
                .await;
        }
    }
}

fn to_position(position: LspPosition) -> Position {
    Position::new(position.line as usize, position.character as usize)
}

fn to_lsp_range(range: Range) -> LspRange {
    LspRange {
        start: LspPosition {
            line: range.start.line as u32,
            character: range.start.character as u32,
        },
        end: LspPosition {
            line: range.end.line as u32,
            character: range.end.character as u32,
        },
    }
}

fn to_lsp_completion(item: completion::CompletionItem) -> LspCompletionItem {
    let kind = match item.kind {
        completion::CompletionKind::Object => CompletionItemKind::MODULE,
        completion::CompletionKind::Value => CompletionItemKind::VARIABLE,
    };

    LspCompletionItem {
        label: item.label,
        kind: Some(kind),
        detail: item.detail,
        insert_text: Some(item.insert_text),
        ..Default::default()
    }
}

/// Server capabilities advertised in the initialize response
fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            TextDocumentSyncOptions {
                open_close: Some(true),
                change: Some(TextDocumentSyncKind::FULL),
                save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                    include_text: Some(true),
                })),
                ..Default::default()
            },
        )),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(vec![".".to_string(), "{".to_string()]),
            resolve_provider: Some(false),
            all_commit_characters: None,
            work_done_progress_options: Default::default(),
            completion_item: None,
        }),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        ..Default::default()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    /// Initialize the language server
    ///
    /// Resolves the workspace root, applies the initialization options and
    /// performs the first load of the variables file.
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        self.log_info(format!(
            "Initializing placeholder variables server (process ID: {:?})",
            params.process_id
        ))
        .await;

        let root = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok())
            .or_else(|| {
                params
                    .workspace_folders
                    .as_ref()
                    .and_then(|folders| folders.first())
                    .and_then(|folder| folder.uri.to_file_path().ok())
            });

        match root {
            Some(root) => {
                self.log_info(format!("Workspace root: {}", root.display()))
                    .await;
                self.set_workspace_root(root);
            }
            None => self.log_warn("No workspace root provided").await,
        }

        match load_config(params.initialization_options.clone()) {
            Ok(config) => self.set_config(config),
            Err(e) => self.log_error(format!("{}. Using defaults.", e)).await,
        }

        let dynamic_watch = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.did_change_watched_files.as_ref())
            .and_then(|watched| watched.dynamic_registration)
            .unwrap_or(false);
        self.dynamic_watch.store(dynamic_watch, Ordering::SeqCst);

        self.reload(SourceEvent::Created).await;

        Ok(InitializeResult {
            capabilities: server_capabilities(),
            server_info: Some(ServerInfo {
                name: "placeholder-vars-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.register_watcher().await;
        self.log_info("Placeholder variables server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.log_info("Shutting down placeholder variables server")
            .await;

        self.documents.clear();
        self.store.clear();

        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        log::debug!("Document opened: {}", document.uri);

        self.documents
            .open(&document.uri, document.text, document.version);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // Full sync: the last change holds the whole document
        let text = match params.content_changes.into_iter().last() {
            Some(change) => change.text,
            None => {
                self.log_warn(format!("No content changes received for document: {}", uri))
                    .await;
                return;
            }
        };

        match self.documents.update(&uri, text.clone(), version) {
            Ok(()) => {}
            Err(DocumentError::NotOpen(_)) => self.documents.open(&uri, text, version),
            Err(e) => self.log_warn(format!("{}: {}", uri, e)).await,
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        log::debug!("Document closed: {}", uri);

        if self.documents.close(&uri).is_none() {
            self.log_warn(format!("Document not found when closing: {}", uri))
                .await;
        }
    }

    /// Reloads the variables when the variables file itself is saved.
    ///
    /// This covers clients without file watching support.
    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let saved = match params.text_document.uri.to_file_path() {
            Ok(path) => path,
            Err(_) => return,
        };
        if !is_source_file(&saved, &self.config().variables_file) {
            return;
        }

        // A matching name only triggers a reload; the root file is the source
        let path = match self.variables_path() {
            Some(path) => path,
            None => return,
        };
        if saved != path {
            self.reload(SourceEvent::Changed).await;
            return;
        }

        let outcome = match params.text {
            Some(text) => source::apply_text(&text, self.store.as_ref()),
            None => source::apply_event(SourceEvent::Changed, &path, self.store.as_ref()),
        };
        self.report(&path, outcome).await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let path = match self.variables_path() {
            Some(path) => path,
            None => return,
        };

        for change in params.changes {
            let changed = match change.uri.to_file_path() {
                Ok(changed) => changed,
                Err(_) => continue,
            };
            if changed != path {
                continue;
            }

            let event = match change.typ {
                FileChangeType::CREATED => SourceEvent::Created,
                FileChangeType::DELETED => SourceEvent::Deleted,
                _ => SourceEvent::Changed,
            };
            let outcome = source::apply_event(event, &path, self.store.as_ref());
            self.report(&path, outcome).await;
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let config = match load_config(Some(params.settings)) {
            Ok(config) => config,
            Err(e) => {
                self.log_error(format!("{}. Keeping current settings.", e))
                    .await;
                return;
            }
        };

        let previous_file = self.config().variables_file;
        let file_changed = previous_file != config.variables_file;
        self.set_config(config);

        if file_changed {
            self.log_info(format!(
                "Variables file changed from {} to {}",
                previous_file,
                self.config().variables_file
            ))
            .await;
            self.unregister_watcher().await;
            self.register_watcher().await;
        }

        self.reload(SourceEvent::Changed).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let document = match self.documents.text(uri) {
            Some(text) => text,
            None => {
                log::debug!("Document not found for completion: {}", uri);
                return Ok(None);
            }
        };

        let snapshot = self.store.snapshot();
        let items = completion::provide_completions(
            to_position(position),
            &document,
            snapshot.as_ref(),
            &self.config(),
        );

        log::debug!(
            "{} completion(s) for {} at {}:{}",
            items.len(),
            uri,
            position.line,
            position.character
        );

        if items.is_empty() {
            return Ok(None);
        }

        Ok(Some(CompletionResponse::Array(
            items.into_iter().map(to_lsp_completion).collect(),
        )))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<LspHover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let document = match self.documents.text(uri) {
            Some(text) => text,
            None => {
                log::debug!("Document not found for hover: {}", uri);
                return Ok(None);
            }
        };

        let snapshot = self.store.snapshot();
        let found = hover::provide_hover(
            to_position(position),
            &document,
            snapshot.as_ref(),
            &self.config(),
        );

        Ok(found.map(|found| LspHover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: found.contents,
            }),
            range: found.range.map(to_lsp_range),
        }))
    }
}
