//! Core error types for formwise.
//!
//! [`FormwiseError`] covers misuse of the engine's API (registering the same
//! field twice, asking for a field that was never registered, illegal submit
//! lifecycle transitions) and configuration failures.
//!
//! Field validation failures are deliberately *not* represented here. They are
//! ordinary data: an error message stored per field, with the empty string
//! meaning "no error".

use thiserror::Error;

/// The primary error type for formwise.
#[derive(Error, Debug)]
pub enum FormwiseError {
    // ── Field registry ───────────────────────────────────────────────

    /// A field with this name is already registered on the form.
    #[error("Duplicate field: {0}")]
    DuplicateField(String),

    /// No field with this name is registered on the form.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    // ── Submit lifecycle ─────────────────────────────────────────────

    /// The submit lifecycle was asked to move between two states that are
    /// not connected.
    #[error("Invalid submit state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// The state the form was in.
        from: String,
        /// The state that was requested.
        to: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormwiseError {
    /// Returns `true` for errors caused by calling the engine incorrectly
    /// rather than by the environment.
    pub const fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateField(_) | Self::UnknownField(_) | Self::InvalidStateTransition { .. }
        )
    }
}

impl From<serde_json::Error> for FormwiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, FormwiseError>`.
pub type FormwiseResult<T> = Result<T, FormwiseError>;
