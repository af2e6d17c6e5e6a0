//! LSP server module for placeholder variables
//!
//! This module provides the Language Server Protocol implementation that serves
//! completions and hovers for `{{ .path }}` references and keeps the variable
//! tree in sync with the variables file.

pub mod backend;
pub mod document;

pub use backend::Backend;
pub use document::{DocumentError, DocumentManager};
