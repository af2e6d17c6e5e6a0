//! Configuration management for the placeholder variables extension.
//!
//! Configuration arrives as LSP initialization options (and later as
//! `workspace/didChangeConfiguration` settings) under the "placeholder-vars"
//! key and is merged with defaults. The server owns the loaded value; there is
//! no process-wide configuration.

pub mod schema;

pub use schema::{CompletionDetail, DelimiterStyle, PlaceholderConfig};

use serde_json::Value;

/// Key under which settings are nested
pub const SETTINGS_KEY: &str = "placeholder-vars";

/// Errors produced while loading configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A setting has a value outside its allowed range
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Loads configuration from a settings JSON value.
///
/// Settings that fail to deserialize are logged and replaced by defaults; the
/// result is then validated.
///
/// # Example
///
/// ```
/// use placeholder_vars::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "placeholder-vars": {
///         "variablesFile": "vars.json"
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.variables_file, "vars.json");
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<PlaceholderConfig, ConfigError> {
    let mut config = PlaceholderConfig::default();

    if let Some(settings) = settings_json {
        if let Some(user_settings) = settings.get(SETTINGS_KEY) {
            match serde_json::from_value::<PlaceholderConfig>(user_settings.clone()) {
                Ok(user_config) => config = user_config,
                Err(e) => {
                    log::warn!(
                        "Failed to parse {} settings: {}. Using defaults.",
                        SETTINGS_KEY,
                        e
                    );
                }
            }
        }
    }

    config.validate()?;
    Ok(config)
}
