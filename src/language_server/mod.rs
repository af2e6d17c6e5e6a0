//! Editor features for placeholder references
//!
//! This module provides the editor-facing features built on the variable tree:
//! - Variable autocompletion (triggered by `{{ .` or `{{{ .`)
//! - Hover tooltips showing the value behind a complete reference
//!
//! These are plain functions over document text and a [`VariableLookup`], so
//! they can be used without the LSP server.
//!
//! [`VariableLookup`]: crate::tree::VariableLookup

pub mod completion;
pub mod hover;
pub mod text;

pub use completion::{provide_completions, reference_fragment, CompletionItem, CompletionKind};
pub use hover::{provide_hover, Hover};
pub use text::{Position, Range};
