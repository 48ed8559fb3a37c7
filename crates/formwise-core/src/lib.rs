//! # formwise-core
//!
//! Core types, settings, and error types for formwise.
//! This crate has no dependency on the form engine and provides the foundation
//! the other crates build on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Engine settings and global configuration
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{FormwiseError, FormwiseResult};
pub use settings::{MessageSettings, Settings, SETTINGS};
