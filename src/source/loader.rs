//! Variables file loader
//!
//! Locates the variables file in the workspace root and reads it from disk.
//! A missing file is not an error: it simply means there are no variables.

use crate::tree::ParseError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default name of the variables file in the workspace root
pub const DEFAULT_VARIABLES_FILE: &str = "variables.json";

/// Errors that can occur while reading the variables source
#[derive(Debug, Clone, PartialEq)]
pub enum SourceError {
    /// IO error occurred while reading the file
    Io(String),

    /// File was read but is not valid JSON
    Parse(ParseError),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io(msg) => write!(f, "Failed to read variables file: {}", msg),
            SourceError::Parse(err) => write!(f, "Failed to parse variables file: {}", err),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}

impl From<ParseError> for SourceError {
    fn from(err: ParseError) -> Self {
        SourceError::Parse(err)
    }
}

/// Path of the variables file for a workspace
pub fn variables_path(workspace_root: &Path, file_name: &str) -> PathBuf {
    workspace_root.join(file_name)
}

/// Reads the variables file.
///
/// # Returns
///
/// * `Ok(Some(text))` - File content
/// * `Ok(None)` - File does not exist
/// * `Err(SourceError)` - File exists but could not be read
pub fn read_source(path: &Path) -> Result<Option<String>, SourceError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Returns true if `candidate` has the same file name as the variables file.
///
/// Used for save notifications, where only the document path is known.
pub fn is_source_file(candidate: &Path, file_name: &str) -> bool {
    let expected = Path::new(file_name).file_name();
    expected.is_some() && candidate.file_name() == expected
}
