//! Configuration schema for the placeholder variables extension.
//!
//! This module defines the configuration structure and validation logic for all
//! user-configurable settings of the language server.

use super::ConfigError;
use crate::source::DEFAULT_VARIABLES_FILE;
use crate::store::ParseFailurePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Main configuration structure for the extension.
///
/// Settings are passed as LSP initialization options under the
/// "placeholder-vars" key. Missing settings fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderConfig {
    /// Name of the variables file, relative to the workspace root.
    ///
    /// Defaults to "variables.json".
    #[serde(default = "default_variables_file")]
    pub variables_file: String,

    /// What to do with the current variables when the file fails to parse.
    ///
    /// "clear" (default) empties the tree, "keep-last-good" keeps serving the
    /// previous contents until a valid file is saved.
    #[serde(default)]
    pub on_parse_error: ParseFailurePolicy,

    /// Which opening delimiter starts a reference.
    #[serde(default)]
    pub delimiter: DelimiterStyle,

    /// What the completion detail line shows.
    #[serde(default)]
    pub completion_detail: CompletionDetail,
}

/// Opening delimiter accepted before the `.` of a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterStyle {
    /// `{{ .path }}`
    Double,
    /// `{{{ .path }}}`
    Triple,
    /// Either of the above
    #[default]
    Any,
}

/// Informational text attached to each completion item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionDetail {
    /// The resolved value as compact JSON
    #[default]
    Value,
    /// The full dot-path of the candidate
    Path,
    /// No detail
    None,
}

impl DelimiterStyle {
    /// Returns true if `open` (a run of `{`) is an accepted opening delimiter
    pub fn accepts_opening(&self, open: &str) -> bool {
        match self {
            DelimiterStyle::Double => open == "{{",
            DelimiterStyle::Triple => open == "{{{",
            DelimiterStyle::Any => open == "{{" || open == "{{{",
        }
    }

    /// Returns true if `close` (a run of `}`) is an accepted closing delimiter
    pub fn accepts_closing(&self, close: &str) -> bool {
        match self {
            DelimiterStyle::Double => close == "}}",
            DelimiterStyle::Triple => close == "}}}",
            DelimiterStyle::Any => close == "}}" || close == "}}}",
        }
    }
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            variables_file: default_variables_file(),
            on_parse_error: ParseFailurePolicy::default(),
            delimiter: DelimiterStyle::default(),
            completion_detail: CompletionDetail::default(),
        }
    }
}

impl PlaceholderConfig {
    /// Validates the configuration.
    ///
    /// The variables file must be a non-empty relative path that stays inside
    /// the workspace root.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let file = self.variables_file.trim();
        if file.is_empty() {
            return Err(ConfigError::InvalidValue(
                "variablesFile must not be empty".to_string(),
            ));
        }

        let path = Path::new(file);
        if path.is_absolute() {
            return Err(ConfigError::InvalidValue(format!(
                "variablesFile must be relative to the workspace root: {}",
                file
            )));
        }

        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(ConfigError::InvalidValue(format!(
                "variablesFile must not leave the workspace root: {}",
                file
            )));
        }

        Ok(())
    }
}

fn default_variables_file() -> String {
    DEFAULT_VARIABLES_FILE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaceholderConfig::default();
        assert_eq!(config.variables_file, "variables.json");
        assert_eq!(config.on_parse_error, ParseFailurePolicy::Clear);
        assert_eq!(config.delimiter, DelimiterStyle::Any);
        assert_eq!(config.completion_detail, CompletionDetail::Value);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialization_with_defaults() {
        let json = r#"{ "onParseError": "keep-last-good" }"#;

        let config: PlaceholderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.on_parse_error, ParseFailurePolicy::KeepLastGood);
        assert_eq!(config.variables_file, "variables.json");
    }

    #[test]
    fn test_enum_deserialization() {
        let json = r#"{ "delimiter": "triple", "completionDetail": "path" }"#;

        let config: PlaceholderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.delimiter, DelimiterStyle::Triple);
        assert_eq!(config.completion_detail, CompletionDetail::Path);
    }

    #[test]
    fn test_delimiter_accepts_opening() {
        assert!(DelimiterStyle::Any.accepts_opening("{{"));
        assert!(DelimiterStyle::Any.accepts_opening("{{{"));
        assert!(DelimiterStyle::Double.accepts_opening("{{"));
        assert!(!DelimiterStyle::Double.accepts_opening("{{{"));
        assert!(DelimiterStyle::Triple.accepts_opening("{{{"));
        assert!(!DelimiterStyle::Triple.accepts_opening("{{"));
        assert!(DelimiterStyle::Triple.accepts_closing("}}}"));
        assert!(!DelimiterStyle::Double.accepts_closing("}}}"));
    }

    #[test]
    fn test_validation_empty_file() {
        let config = PlaceholderConfig {
            variables_file: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidValue(
                "variablesFile must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn test_validation_parent_dir() {
        let config = PlaceholderConfig {
            variables_file: "../secrets.json".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_nested_relative_path() {
        let config = PlaceholderConfig {
            variables_file: "config/vars.json".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&PlaceholderConfig::default()).unwrap();
        assert!(json.contains("variablesFile"));
        assert!(json.contains("\"onParseError\":\"clear\""));
    }
}
