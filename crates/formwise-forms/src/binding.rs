//! Per-field bindings.
//!
//! A [`FieldBinding`] connects one input to its form session. The host reads
//! the field's value and error from it and forwards the input's change, blur
//! and focus plumbing to it.

use std::rc::Rc;

use formwise_core::FormwiseResult;

use crate::session::FormSession;
use crate::value::{ErrorMessage, FieldName, FieldValue};

/// One field's handle into its form.
///
/// Validation timing follows two rules:
/// - a change re-validates immediately only if the field already shows an error
/// - a blur always validates
///
/// # Examples
///
/// ```
/// use formwise_forms::constraints::FieldConstraints;
/// use formwise_forms::session::FormSession;
///
/// let session = FormSession::builder().build();
/// let email = session.register("email", FieldConstraints::email().required(true)).unwrap();
///
/// email.set_value("llama");
/// assert_eq!(email.error(), "");
/// assert_eq!(email.blur(), "Please enter an email address");
///
/// email.set_value("llama@example.com");
/// assert_eq!(email.error(), "");
/// ```
#[derive(Debug, Clone)]
pub struct FieldBinding {
    session: FormSession,
    name: FieldName,
}

impl FieldBinding {
    pub(crate) fn new(session: FormSession, name: FieldName) -> Self {
        Self { session, name }
    }

    /// Returns the field's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the session this field belongs to.
    pub const fn session(&self) -> &FormSession {
        &self.session
    }

    /// Returns the field's current value.
    pub fn value(&self) -> FieldValue {
        self.session.value(&self.name)
    }

    /// Returns the field's current error (`""` if it has none).
    pub fn error(&self) -> ErrorMessage {
        self.session.error(&self.name)
    }

    /// Returns `true` if the field currently shows an error.
    pub fn has_error(&self) -> bool {
        !self.error().is_empty()
    }

    /// Returns `true` while the field is part of its form.
    pub fn is_registered(&self) -> bool {
        self.session.is_registered(&self.name)
    }

    /// Handles an input change.
    ///
    /// The value is merged into the form. If the field showed an error before
    /// the change, it is re-validated against the updated values so the
    /// message clears as soon as the input becomes valid.
    pub fn set_value(&self, value: impl Into<FieldValue>) {
        let _entered = self.session.span().enter();
        let had_error = self.has_error();
        self.session.set_value(&self.name, value.into());
        if had_error {
            self.validate_now();
        }
    }

    /// Validates the field now and returns its new error.
    pub fn validate_now(&self) -> ErrorMessage {
        self.session.validate_field(&self.name)
    }

    /// Handles the input losing focus.
    pub fn blur(&self) -> ErrorMessage {
        let _entered = self.session.span().enter();
        tracing::trace!(field = %self.name, "field blurred");
        self.validate_now()
    }

    /// Sets how the host moves focus to this field.
    ///
    /// Used by the submit sweep to focus the first invalid field.
    pub fn on_focus(&self, handler: impl Fn() + 'static) -> FormwiseResult<()> {
        self.session.set_focus_handler(&self.name, Rc::new(handler))
    }

    /// Removes the field from its form.
    ///
    /// The field stops taking part in submit sweeps and loses its error and
    /// focus handler. Its last value stays in the form's values. Dropping a
    /// binding without calling this leaves the field registered.
    pub fn teardown(self) {
        self.session.unregister(&self.name);
    }
}
