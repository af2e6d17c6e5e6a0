//! Placeholder Variables Extension for Zed Editor
//!
//! This extension completes and explains `{{ .path }}` placeholder references
//! in Markdown and plain-text files, using the values in a JSON variables file
//! at the workspace root.
//!
//! # Architecture
//!
//! - **tree**: The variable tree, dot-paths and completion candidates
//! - **store**: Shared, atomically swapped tree snapshot fed by the source
//! - **source**: Reads the variables file and maps file events onto the store
//! - **config**: User settings (file name, parse-failure policy, delimiters)
//! - **language_server**: Completion and hover providers over document text
//! - **lsp_server**: tower-lsp backend (behind the `lsp` feature)
//!
//! # Usage
//!
//! Create `variables.json` in the workspace root:
//!
//! ```json
//! { "user": { "name": "Ada", "age": 37 }, "env": "prod" }
//! ```
//!
//! Then typing `{{ .user.` in a Markdown file offers `name` and `age`, and
//! hovering `{{ .user.name }}` shows `"Ada"`. The tree follows the file as it
//! is created, changed or deleted.

use zed_extension_api::{self as zed, serde_json::Value};

pub mod config;
pub mod language_server;
#[cfg(feature = "lsp")]
pub mod lsp_server;
pub mod source;
pub mod store;
pub mod tree;

/// Name of the language server binary
const SERVER_BINARY: &str = "placeholder-vars-lsp";

/// Zed extension that launches the placeholder variables language server.
struct PlaceholderVarsExtension;

impl zed::Extension for PlaceholderVarsExtension {
    fn new() -> Self {
        Self
    }

    fn language_server_command(
        &mut self,
        _language_server_id: &zed::LanguageServerId,
        worktree: &zed::Worktree,
    ) -> zed::Result<zed::Command> {
        let (os, _) = zed::current_platform();
        let binary_name = if matches!(os, zed::Os::Windows) {
            format!("{}.exe", SERVER_BINARY)
        } else {
            SERVER_BINARY.to_string()
        };

        // Prefer a binary on PATH, else the one installed next to extension.wasm
        let command = worktree
            .which(&binary_name)
            .unwrap_or_else(|| format!("./{}", binary_name));

        Ok(zed::Command {
            command,
            args: vec![],
            env: vec![],
        })
    }

    fn language_server_initialization_options(
        &mut self,
        language_server_id: &zed::LanguageServerId,
        worktree: &zed::Worktree,
    ) -> zed::Result<Option<Value>> {
        let settings = zed::settings::LspSettings::for_worktree(language_server_id.as_ref(), worktree)
            .ok()
            .and_then(|lsp_settings| lsp_settings.initialization_options);
        Ok(wrap_settings(settings))
    }

    fn language_server_workspace_configuration(
        &mut self,
        language_server_id: &zed::LanguageServerId,
        worktree: &zed::Worktree,
    ) -> zed::Result<Option<Value>> {
        let settings = zed::settings::LspSettings::for_worktree(language_server_id.as_ref(), worktree)
            .ok()
            .and_then(|lsp_settings| lsp_settings.settings);
        Ok(wrap_settings(settings))
    }
}

/// Nests user settings under the key the server reads them from
fn wrap_settings(settings: Option<Value>) -> Option<Value> {
    settings.map(|settings| {
        let mut wrapped = zed::serde_json::Map::new();
        wrapped.insert(config::SETTINGS_KEY.to_string(), settings);
        Value::Object(wrapped)
    })
}

zed::register_extension!(PlaceholderVarsExtension);
