//! The per-form session.
//!
//! A [`FormSession`] is created when a form mounts and dropped when it
//! unmounts. It owns the form's [`FormStore`], its validators, the ordered
//! registry of present fields, and the submit lifecycle state. Bindings and
//! controllers hold a clone of the session handle; nothing is discovered
//! ambiently.
//!
//! The engine is single-threaded: every operation runs to completion on the
//! thread dispatching the UI event. No internal borrow is held while caller
//! code (validators, focus handlers, submit handlers, host change listeners)
//! runs.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use formwise_core::logging::form_span;
use formwise_core::settings::{MessageSettings, Settings, SETTINGS};
use formwise_core::{FormwiseError, FormwiseResult};

use crate::binding::FieldBinding;
use crate::constraints::{ConstraintSource, NativeConstraintAdapter};
use crate::controller::SubmitState;
use crate::registry::{FieldRegistry, FocusHandler, RegisteredField};
use crate::store::{ChangeNotice, ControlledState, FormStore};
use crate::validation::{ValidationPipeline, ValidatorRegistry};
use crate::value::{ErrorMessage, FieldName, FieldValue, FormErrors, FormValues};

/// Identifies one form session in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormId(Uuid);

impl FormId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The result of one full sweep over every registered field.
pub(crate) struct Sweep {
    pub(crate) errors: FormErrors,
    pub(crate) first_invalid: Option<RegisteredField>,
}

struct SessionInner {
    id: FormId,
    span: tracing::Span,
    store: RefCell<FormStore>,
    pipeline: RefCell<ValidationPipeline>,
    fields: RefCell<FieldRegistry>,
    state: Cell<SubmitState>,
    focus_first_error: bool,
}

/// Builder for [`FormSession`].
///
/// Settings default to the global [`SETTINGS`] when configured, and to
/// [`Settings::default`] otherwise.
#[derive(Default)]
pub struct FormSessionBuilder {
    validators: ValidatorRegistry,
    initial_values: FormValues,
    controlled: Option<ControlledState>,
    messages: Option<MessageSettings>,
    settings: Option<Settings>,
}

impl FormSessionBuilder {
    /// Sets the form's validators.
    #[must_use]
    pub fn validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    /// Sets the values the form starts with.
    #[must_use]
    pub fn initial_values(mut self, values: FormValues) -> Self {
        self.initial_values = values;
        self
    }

    /// Keeps values and errors in host-owned state instead of the session.
    ///
    /// Initial values are written into the host's state only for fields it
    /// does not already hold.
    #[must_use]
    pub fn controlled(mut self, state: ControlledState) -> Self {
        self.controlled = Some(state);
        self
    }

    /// Overrides the baseline constraint messages from the settings.
    #[must_use]
    pub fn messages(mut self, messages: MessageSettings) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Uses these settings instead of the global ones.
    #[must_use]
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.settings = Some(settings.clone());
        self
    }

    /// Builds the session.
    pub fn build(self) -> FormSession {
        let settings = self
            .settings
            .or_else(|| SETTINGS.try_get().cloned())
            .unwrap_or_default();
        let messages = self.messages.unwrap_or_else(|| settings.messages.clone());

        let store = match self.controlled {
            Some(state) => {
                let mut store = FormStore::new(state);
                let existing = store.values();
                for (name, value) in self.initial_values {
                    if !existing.contains(&name) {
                        store.merge_value(&name, value).deliver();
                    }
                }
                store
            }
            None => FormStore::local(self.initial_values),
        };

        let id = FormId::new();
        FormSession {
            inner: Rc::new(SessionInner {
                id,
                span: form_span(&id.to_string()),
                store: RefCell::new(store),
                pipeline: RefCell::new(ValidationPipeline::new(
                    self.validators,
                    NativeConstraintAdapter::new(messages),
                )),
                fields: RefCell::new(FieldRegistry::default()),
                state: Cell::new(SubmitState::Pristine),
                focus_first_error: settings.focus_first_error_on_submit,
            }),
        }
    }
}

/// Shared handle to one form's state.
///
/// Cloning the handle is cheap; all clones see the same form.
///
/// # Examples
///
/// ```
/// use formwise_forms::constraints::FieldConstraints;
/// use formwise_forms::session::FormSession;
///
/// let session = FormSession::builder().build();
/// let name = session.register("name", FieldConstraints::text().required(true)).unwrap();
///
/// name.set_value("Ann");
/// assert_eq!(name.validate_now(), "");
/// assert!(session.is_valid());
/// ```
#[derive(Clone)]
pub struct FormSession {
    inner: Rc<SessionInner>,
}

impl FormSession {
    /// Starts building a session.
    pub fn builder() -> FormSessionBuilder {
        FormSessionBuilder::default()
    }

    /// Creates a self-owned session with the given validators and default settings.
    pub fn new(validators: ValidatorRegistry) -> Self {
        Self::builder().validators(validators).build()
    }

    /// Returns this session's identifier.
    pub fn id(&self) -> FormId {
        self.inner.id
    }

    /// Returns the tracing span covering this session's work.
    pub fn span(&self) -> &tracing::Span {
        &self.inner.span
    }

    /// Registers a field at the end of the form and returns its binding.
    ///
    /// A field with no value yet is seeded with `Absent`.
    pub fn register(
        &self,
        name: impl Into<FieldName>,
        constraints: impl ConstraintSource + 'static,
    ) -> FormwiseResult<FieldBinding> {
        let name = name.into();
        self.inner
            .fields
            .borrow_mut()
            .insert(&name, Rc::new(constraints))?;

        let seeded = self.inner.store.borrow().values().contains(&name);
        if !seeded {
            self.write_store(|store| store.merge_value(&name, FieldValue::Absent));
        }
        tracing::debug!(parent: &self.inner.span, field = %name, "registered field");
        Ok(FieldBinding::new(self.clone(), name))
    }

    /// Issues another binding for an already registered field.
    pub fn binding(&self, name: &str) -> FormwiseResult<FieldBinding> {
        if self.is_registered(name) {
            Ok(FieldBinding::new(self.clone(), name.to_string()))
        } else {
            Err(FormwiseError::UnknownField(name.to_string()))
        }
    }

    /// Returns `true` if a field with this name is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.fields.borrow().contains(name)
    }

    /// Returns the registered field names in registration order.
    pub fn field_names(&self) -> Vec<FieldName> {
        self.inner.fields.borrow().names()
    }

    /// Returns a snapshot of every field's value.
    pub fn values(&self) -> FormValues {
        self.inner.store.borrow().values()
    }

    /// Returns a snapshot of every field's error.
    pub fn errors(&self) -> FormErrors {
        self.inner.store.borrow().errors()
    }

    /// Returns one field's value.
    pub fn value(&self, name: &str) -> FieldValue {
        self.inner.store.borrow().value(name)
    }

    /// Returns one field's error (`""` if it has none).
    pub fn error(&self, name: &str) -> ErrorMessage {
        self.inner.store.borrow().error(name)
    }

    /// Returns `true` when no field has a non-empty error.
    pub fn is_valid(&self) -> bool {
        self.inner.store.borrow().is_valid()
    }

    /// Returns the current submit lifecycle state.
    pub fn state(&self) -> SubmitState {
        self.inner.state.get()
    }

    /// Replaces the form's validators.
    pub fn set_validators(&self, validators: ValidatorRegistry) {
        self.inner.pipeline.borrow_mut().set_validators(validators);
    }

    /// Sets one field's error directly, keeping every other error.
    ///
    /// Passing an empty message clears the field's error.
    pub fn set_error(&self, name: &str, message: impl Into<ErrorMessage>) {
        let message = message.into();
        self.write_store(|store| store.merge_error(name, message));
    }

    /// Clears every error.
    pub fn clear_errors(&self) {
        self.write_store(|store| store.replace_errors(FormErrors::new()));
    }

    /// Writes to the store, then tells the host once the store is released.
    fn write_store(&self, write: impl FnOnce(&mut FormStore) -> ChangeNotice) {
        let notice = write(&mut self.inner.store.borrow_mut());
        notice.deliver();
    }

    pub(crate) fn focus_first_error_on_submit(&self) -> bool {
        self.inner.focus_first_error
    }

    pub(crate) fn set_value(&self, name: &str, value: FieldValue) {
        self.write_store(|store| store.merge_value(name, value));
        let state = self.state();
        if state.can_transition_to(SubmitState::Editing) {
            self.inner.state.set(SubmitState::Editing);
        } else {
            tracing::trace!(field = name, %state, "edit outside an editable state");
        }
    }

    /// Validates one field against the current values and merges the result.
    pub(crate) fn validate_field(&self, name: &str) -> ErrorMessage {
        let pipeline = self.inner.pipeline.borrow().clone();
        let source = self
            .inner
            .fields
            .borrow()
            .get(name)
            .map(|field| Rc::clone(&field.constraints));
        let values = self.values();

        let message = pipeline.validate(name, values.get(name), &values, source.as_deref());
        self.write_store(|store| store.merge_error(name, message.clone()));
        message
    }

    /// Validates every registered field in registration order.
    ///
    /// Every field is evaluated; an earlier failure never skips a later field.
    pub(crate) fn sweep(&self) -> Sweep {
        let pipeline = self.inner.pipeline.borrow().clone();
        let fields = self.inner.fields.borrow().fields().to_vec();
        let values = self.values();

        let mut errors = FormErrors::new();
        let mut first_invalid = None;
        for field in fields {
            let message = pipeline.validate(
                &field.name,
                values.get(&field.name),
                &values,
                Some(field.constraints.as_ref()),
            );
            errors.insert(field.name.clone(), message.clone());
            if !message.is_empty() && first_invalid.is_none() {
                first_invalid = Some(field);
            }
        }
        Sweep {
            errors,
            first_invalid,
        }
    }

    pub(crate) fn replace_errors(&self, errors: FormErrors) {
        self.write_store(|store| store.replace_errors(errors));
    }

    pub(crate) fn transition(&self, to: SubmitState) -> FormwiseResult<()> {
        let from = self.state();
        if !from.can_transition_to(to) {
            return Err(FormwiseError::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.inner.state.set(to);
        Ok(())
    }

    pub(crate) fn set_focus_handler(&self, name: &str, handler: FocusHandler) -> FormwiseResult<()> {
        self.inner.fields.borrow_mut().set_focus(name, handler)
    }

    pub(crate) fn unregister(&self, name: &str) {
        if self.inner.fields.borrow_mut().remove(name) {
            self.write_store(|store| store.remove_error(name));
            tracing::debug!(parent: &self.inner.span, field = name, "unregistered field");
        }
    }
}

impl fmt::Debug for FormSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSession")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("fields", &self.field_names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::FieldConstraints;

    #[test]
    fn test_register_seeds_absent() {
        let session = FormSession::builder().build();
        session.register("name", FieldConstraints::text()).unwrap();
        assert!(session.values().contains("name"));
        assert_eq!(session.value("name"), FieldValue::Absent);
    }

    #[test]
    fn test_register_keeps_initial_value() {
        let session = FormSession::builder()
            .initial_values(FormValues::new().with("name", "Ann"))
            .build();
        let name = session.register("name", FieldConstraints::text()).unwrap();
        assert_eq!(name.value(), FieldValue::from("Ann"));
    }

    #[test]
    fn test_register_duplicate_fails() {
        let session = FormSession::builder().build();
        session.register("name", FieldConstraints::text()).unwrap();
        let err = session.register("name", FieldConstraints::text()).unwrap_err();
        assert!(matches!(err, FormwiseError::DuplicateField(_)));
    }

    #[test]
    fn test_binding_for_unknown_field_fails() {
        let session = FormSession::builder().build();
        assert!(matches!(
            session.binding("ghost"),
            Err(FormwiseError::UnknownField(_))
        ));
    }

    #[test]
    fn test_field_names_follow_registration_order() {
        let session = FormSession::builder().build();
        for name in ["email", "emailCc", "website", "name"] {
            session.register(name, FieldConstraints::text()).unwrap();
        }
        assert_eq!(
            session.field_names(),
            vec!["email", "emailCc", "website", "name"]
        );
    }

    #[test]
    fn test_is_valid_is_derived_from_errors() {
        let session = FormSession::builder().build();
        assert!(session.is_valid());
        session.set_error("a", "A");
        assert!(!session.is_valid());
        session.set_error("a", "");
        assert!(session.is_valid());
        session.set_error("b", "B");
        session.clear_errors();
        assert!(session.is_valid());
    }

    #[test]
    fn test_sweep_evaluates_every_field() {
        let session = FormSession::builder().build();
        session
            .register("a", FieldConstraints::text().required(true))
            .unwrap();
        session.register("b", FieldConstraints::text()).unwrap();
        session
            .register("c", FieldConstraints::text().required(true))
            .unwrap();

        let sweep = session.sweep();
        assert_eq!(sweep.errors.len(), 3);
        assert_eq!(sweep.errors.get("a"), "This field is required");
        assert_eq!(sweep.errors.get("b"), "");
        assert_eq!(sweep.errors.get("c"), "This field is required");
        assert_eq!(sweep.first_invalid.map(|field| field.name), Some("a".to_string()));
    }

    #[test]
    fn test_explicit_settings_messages() {
        let mut settings = Settings::default();
        settings.messages.required = "Required.".to_string();
        let session = FormSession::builder().settings(&settings).build();
        let name = session
            .register("name", FieldConstraints::text().required(true))
            .unwrap();
        assert_eq!(name.validate_now(), "Required.");
    }

    #[test]
    fn test_messages_override_settings() {
        let session = FormSession::builder()
            .settings(&Settings::default())
            .messages(MessageSettings {
                fallback: "Out of range".to_string(),
                ..MessageSettings::default()
            })
            .build();
        let puppies = session
            .register("puppies", FieldConstraints::number().min(3.0))
            .unwrap();
        puppies.set_value(1);
        assert_eq!(puppies.validate_now(), "Out of range");
    }

    #[test]
    fn test_state_transitions_are_checked() {
        let session = FormSession::builder().build();
        assert_eq!(session.state(), SubmitState::Pristine);
        let err = session.transition(SubmitState::Submitted).unwrap_err();
        assert!(err.is_usage_error());
        session.transition(SubmitState::Validating).unwrap();
        assert_eq!(session.state(), SubmitState::Validating);
    }

    #[test]
    fn test_form_ids_are_unique() {
        let a = FormSession::builder().build();
        let b = FormSession::builder().build();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id().to_string().len(), 36);
    }
}
