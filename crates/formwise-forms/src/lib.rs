//! # formwise-forms
//!
//! The form engine. A form is a [`FormSession`](session::FormSession) holding
//! every field's value and error. Fields join the form through
//! [`FieldBinding`](binding::FieldBinding)s, which decide when a field is
//! validated. A [`FormController`](controller::FormController) validates the
//! whole form on submit and hands valid values to the submit handler.
//!
//! ## Modules
//!
//! - [`value`] - Field values and the value/error maps
//! - [`constraints`] - Baseline input constraints and their messages
//! - [`validation`] - Custom validators and the per-field validation pipeline
//! - [`store`] - Self-owned and host-owned form state
//! - [`session`] - The per-form session and its builder
//! - [`binding`] - Per-field bindings
//! - [`controller`] - Submit handling and the submit lifecycle

pub mod binding;
pub mod constraints;
pub mod controller;
mod registry;
pub mod session;
pub mod store;
pub mod validation;
pub mod value;

pub use binding::FieldBinding;
pub use constraints::{
    BaselineViolation, ConstraintSource, FieldConstraints, InputKind, NativeConstraintAdapter,
    ValidityState,
};
pub use controller::{FormController, HostSubmitEvent, SubmitEvent, SubmitOutcome, SubmitState};
pub use registry::FocusHandler;
pub use session::{FormId, FormSession, FormSessionBuilder};
pub use store::{ControlledState, FormStore, LocalState, StateBackend};
pub use validation::{ValidationFailure, ValidationPipeline, Validator, ValidatorRegistry};
pub use value::{ErrorMessage, FieldName, FieldValue, FormErrors, FormValues};
