//! # formwise
//!
//! A form-state and validation engine.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient access.
//! You can depend on `formwise` to get the whole engine, or depend on the
//! individual crates for finer-grained control.
//!
//! ```
//! use formwise::forms::{FieldConstraints, FormController, FormSession, HostSubmitEvent};
//!
//! let session = FormSession::builder().build();
//! let email = session
//!     .register("email", FieldConstraints::email().required(true))
//!     .unwrap();
//! let mut controller = FormController::new(session, |_values| {});
//!
//! let outcome = controller.submit(&mut HostSubmitEvent::new()).unwrap();
//! assert!(!outcome.is_submitted());
//! assert_eq!(email.error(), "This field is required");
//! ```

/// Settings, logging, and error types.
pub use formwise_core as core;

/// Field values, validators, bindings, and submission.
#[cfg(feature = "forms")]
pub use formwise_forms as forms;

/// Re-export of the `tracing` crate used for all engine logging.
pub use tracing;

/// Re-export of `tracing-subscriber` for hosts that install their own subscriber.
pub use tracing_subscriber;
