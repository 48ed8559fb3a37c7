//! Settings loading from configuration files.
//!
//! This module provides functions to load [`Settings`] from TOML files, JSON
//! files, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (deep-merged over the defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMWISE_DEBUG` | `debug` |
//! | `FORMWISE_LOG_LEVEL` | `log_level` |
//! | `FORMWISE_FOCUS_FIRST_ERROR` | `focus_first_error_on_submit` |
//! | `FORMWISE_MESSAGE_REQUIRED` | `messages.required` |
//! | `FORMWISE_MESSAGE_EMAIL` | `messages.email` |
//! | `FORMWISE_MESSAGE_URL` | `messages.url` |
//! | `FORMWISE_MESSAGE_FALLBACK` | `messages.fallback` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use formwise_core::settings_loader;
//!
//! // Load from TOML
//! let settings = settings_loader::from_toml_file("config/forms.toml").unwrap();
//!
//! // Load JSON or TOML by extension, then apply environment overrides
//! let settings = settings_loader::from_file_with_env("config/forms.json").unwrap();
//! ```

use std::path::Path;

use crate::error::FormwiseError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values, including
/// individual keys of nested tables such as `[messages]`.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FormwiseError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormwiseError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FormwiseError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        FormwiseError::ConfigurationError(format!(
            "Failed to read TOML file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, FormwiseError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormwiseError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FormwiseError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        FormwiseError::ConfigurationError(format!(
            "Failed to read JSON file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_json_str(&content)
}

/// Loads a settings file, picking the format from the extension.
///
/// Files ending in `.json` are parsed as JSON; everything else as TOML.
/// Environment overrides are applied afterwards.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormwiseError> {
    let is_json = path
        .as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let mut settings = if is_json {
        from_json_file(path)?
    } else {
        from_toml_file(path)?
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Supported environment variables:
///
/// - `FORMWISE_DEBUG` -> `debug` (values: "true"/"1"/"yes" => true, anything else => false)
/// - `FORMWISE_LOG_LEVEL` -> `log_level`
/// - `FORMWISE_FOCUS_FIRST_ERROR` -> `focus_first_error_on_submit` (same truthiness as debug)
/// - `FORMWISE_MESSAGE_REQUIRED` -> `messages.required`
/// - `FORMWISE_MESSAGE_EMAIL` -> `messages.email`
/// - `FORMWISE_MESSAGE_URL` -> `messages.url`
/// - `FORMWISE_MESSAGE_FALLBACK` -> `messages.fallback`
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FORMWISE_DEBUG") {
        settings.debug = is_truthy(&val);
    }

    if let Ok(val) = std::env::var("FORMWISE_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("FORMWISE_FOCUS_FIRST_ERROR") {
        settings.focus_first_error_on_submit = is_truthy(&val);
    }

    if let Ok(val) = std::env::var("FORMWISE_MESSAGE_REQUIRED") {
        settings.messages.required = val;
    }

    if let Ok(val) = std::env::var("FORMWISE_MESSAGE_EMAIL") {
        settings.messages.email = val;
    }

    if let Ok(val) = std::env::var("FORMWISE_MESSAGE_URL") {
        settings.messages.url = val;
    }

    if let Ok(val) = std::env::var("FORMWISE_MESSAGE_FALLBACK") {
        settings.messages.fallback = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn is_truthy(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Deep-merges a parsed document over the default settings and deserializes it.
fn merge_over_defaults(
    value: serde_json::Value,
    format: &str,
) -> Result<Settings, FormwiseError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        FormwiseError::SerializationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        FormwiseError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
