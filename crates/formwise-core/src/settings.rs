//! Settings system for formwise.
//!
//! This module provides the [`Settings`] struct, which holds engine-wide
//! configuration, and [`LazySettings`], a globally-accessible, lazily-initialized
//! settings instance. Form sessions read the global instance when one has been
//! configured and fall back to [`Settings::default`] otherwise.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Baseline constraint messages shown for platform-level validity failures.
///
/// These are the messages the native constraint adapter reports when a field
/// fails a required, type, or other declared constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSettings {
    /// Message for a required field with no value.
    pub required: String,
    /// Message for an email-typed field holding something that is not an email.
    pub email: String,
    /// Message for a url-typed field holding something that is not a URL.
    pub url: String,
    /// Message for every other baseline constraint failure.
    pub fallback: String,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            required: "This field is required".to_string(),
            email: "Please enter an email address".to_string(),
            url: "Please enter a URL".to_string(),
            fallback: "Something else".to_string(),
        }
    }
}

/// The complete set of engine settings.
///
/// # Examples
///
/// ```
/// use formwise_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(!settings.debug);
/// assert!(settings.focus_first_error_on_submit);
/// assert_eq!(settings.messages.required, "This field is required");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,

    // ── Submission ───────────────────────────────────────────────────

    /// Whether a rejected submit moves focus to the first invalid field.
    pub focus_first_error_on_submit: bool,

    // ── Messages ─────────────────────────────────────────────────────

    /// Baseline constraint messages.
    pub messages: MessageSettings,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level or filter directive (e.g. "info", "formwise_forms=trace").
    pub log_level: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            focus_first_error_on_submit: true,
            messages: MessageSettings::default(),
            log_level: "info".to_string(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`get`](LazySettings::get) panics if settings have not been configured.
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, if any.
    pub fn try_get(&self) -> Option<&Settings> {
        self.inner.get()
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
///
/// Call `SETTINGS.configure(settings)` once at application startup. Sessions
/// built without explicit settings pick it up from here.
pub static SETTINGS: LazySettings = LazySettings::new();
