//! Form submission.
//!
//! The [`FormController`] owns a form's submit handler. On submit it suppresses
//! the host's default submission, validates every registered field in render
//! order, replaces the error map with the result, and either focuses the first
//! invalid field or hands the values to the submit handler.

use std::fmt;

use formwise_core::FormwiseResult;

use crate::session::FormSession;
use crate::value::{FieldName, FormErrors, FormValues};

/// A host submit event whose default action can be suppressed.
pub trait SubmitEvent {
    /// Stops the host from performing its own submission.
    fn prevent_default(&mut self);
}

/// A plain submit event that records whether its default was prevented.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HostSubmitEvent {
    default_prevented: bool,
}

impl HostSubmitEvent {
    /// Creates an event whose default has not been prevented.
    pub const fn new() -> Self {
        Self {
            default_prevented: false,
        }
    }

    /// Returns `true` once [`SubmitEvent::prevent_default`] has been called.
    pub const fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl SubmitEvent for HostSubmitEvent {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Where a form is in its edit/submit lifecycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitState {
    /// Nothing has been edited or submitted yet.
    #[default]
    Pristine,
    /// A value has changed since the last submit attempt.
    Editing,
    /// A submit sweep is running.
    Validating,
    /// The last submit sweep found at least one error.
    Invalid,
    /// The last submit sweep found no errors.
    Valid,
    /// The submit handler is running.
    Submitting,
    /// The submit handler has returned.
    Submitted,
}

impl SubmitState {
    /// Returns `true` if the lifecycle may move from `self` to `next`.
    ///
    /// A submit handler may edit values or submit again while it runs.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Pristine
                    | Self::Editing
                    | Self::Invalid
                    | Self::Submitting
                    | Self::Submitted,
                Self::Editing | Self::Validating
            ) | (Self::Validating, Self::Invalid | Self::Valid)
                | (Self::Valid, Self::Submitting)
                | (Self::Submitting, Self::Submitted)
        )
    }

    /// Returns the lowercase name used in logs and errors.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pristine => "pristine",
            Self::Editing => "editing",
            Self::Validating => "validating",
            Self::Invalid => "invalid",
            Self::Valid => "valid",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
        }
    }
}

impl fmt::Display for SubmitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a submit attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every field was valid and the submit handler ran.
    Submitted,
    /// At least one field was invalid; the handler did not run.
    Rejected {
        /// The first invalid field in render order.
        first_invalid: FieldName,
        /// The full error map produced by the sweep.
        errors: FormErrors,
    },
}

impl SubmitOutcome {
    /// Returns `true` if the submit handler ran.
    pub const fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

/// The handler that receives a valid form's values.
pub type SubmitHandler = Box<dyn FnMut(FormValues)>;

/// Orchestrates submission of one form.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use formwise_forms::constraints::FieldConstraints;
/// use formwise_forms::controller::{FormController, HostSubmitEvent};
/// use formwise_forms::session::FormSession;
///
/// let session = FormSession::builder().build();
/// let name = session.register("name", FieldConstraints::text().required(true)).unwrap();
///
/// let submitted = Rc::new(RefCell::new(None));
/// let sink = Rc::clone(&submitted);
/// let mut controller = FormController::new(session, move |values| {
///     *sink.borrow_mut() = Some(values);
/// });
///
/// let outcome = controller.submit(&mut HostSubmitEvent::new()).unwrap();
/// assert!(!outcome.is_submitted());
/// assert_eq!(name.error(), "This field is required");
///
/// name.set_value("Ann");
/// assert!(controller.submit(&mut HostSubmitEvent::new()).unwrap().is_submitted());
/// assert!(submitted.borrow().is_some());
/// ```
pub struct FormController {
    session: FormSession,
    on_submit: SubmitHandler,
}

impl FormController {
    /// Creates a controller for `session` that passes valid values to `on_submit`.
    pub fn new(session: FormSession, on_submit: impl FnMut(FormValues) + 'static) -> Self {
        Self {
            session,
            on_submit: Box::new(on_submit),
        }
    }

    /// Returns the session this controller submits.
    pub const fn session(&self) -> &FormSession {
        &self.session
    }

    /// Returns `true` when no field currently has an error.
    pub fn is_valid(&self) -> bool {
        self.session.is_valid()
    }

    /// Handles a submit event.
    ///
    /// The event's default is always prevented. Every registered field is
    /// validated in render order and the error map is replaced with exactly
    /// the sweep's result. If any field failed, the first one in render order
    /// is focused and the handler is not called. Otherwise the handler
    /// receives the current values.
    ///
    /// Fails only when called from a lifecycle state that cannot start a
    /// submit, such as from inside a validator.
    pub fn submit(&mut self, event: &mut dyn SubmitEvent) -> FormwiseResult<SubmitOutcome> {
        event.prevent_default();

        let span = self.session.span().clone();
        let _entered = span.enter();

        self.session.transition(SubmitState::Validating)?;
        tracing::debug!(
            fields = self.session.field_names().len(),
            "submit sweep started"
        );
        let sweep = self.session.sweep();
        let errors = sweep.errors;
        self.session.replace_errors(errors.clone());
        tracing::debug!(fields = errors.len(), "submit sweep finished");

        if let Some(field) = sweep.first_invalid {
            self.session.transition(SubmitState::Invalid)?;
            tracing::debug!(
                invalid = ?errors.invalid_fields(),
                first = %field.name,
                "submission rejected"
            );
            if self.session.focus_first_error_on_submit() {
                if let Some(focus) = &field.focus {
                    focus();
                }
            }
            return Ok(SubmitOutcome::Rejected {
                first_invalid: field.name,
                errors,
            });
        }

        self.session.transition(SubmitState::Valid)?;
        self.session.transition(SubmitState::Submitting)?;
        let values = self.session.values();
        tracing::info!(fields = values.len(), "submitting form");
        (self.on_submit)(values);

        if self.session.state() == SubmitState::Submitting {
            self.session.transition(SubmitState::Submitted)?;
        }
        Ok(SubmitOutcome::Submitted)
    }
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::constraints::FieldConstraints;
    use formwise_core::FormwiseError;

    fn recording_controller(session: &FormSession) -> (FormController, Rc<RefCell<Vec<FormValues>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let controller = FormController::new(session.clone(), move |values| {
            sink.borrow_mut().push(values);
        });
        (controller, calls)
    }

    #[test]
    fn test_submit_prevents_default() {
        let session = FormSession::builder().build();
        let (mut controller, _) = recording_controller(&session);
        let mut event = HostSubmitEvent::new();
        assert!(!event.is_default_prevented());
        controller.submit(&mut event).unwrap();
        assert!(event.is_default_prevented());
    }

    #[test]
    fn test_submit_empty_form_calls_handler() {
        let session = FormSession::builder().build();
        let (mut controller, calls) = recording_controller(&session);
        let outcome = controller.submit(&mut HostSubmitEvent::new()).unwrap();
        assert_eq!(outcome, SubmitOutcome::Submitted);
        assert_eq!(calls.borrow().len(), 1);
        assert_eq!(session.state(), SubmitState::Submitted);
    }

    #[test]
    fn test_rejected_submit_reports_first_invalid() {
        let session = FormSession::builder().build();
        session.register("a", FieldConstraints::text()).unwrap();
        session
            .register("b", FieldConstraints::text().required(true))
            .unwrap();
        session
            .register("c", FieldConstraints::text().required(true))
            .unwrap();
        let (mut controller, calls) = recording_controller(&session);

        let outcome = controller.submit(&mut HostSubmitEvent::new()).unwrap();
        match outcome {
            SubmitOutcome::Rejected {
                first_invalid,
                errors,
            } => {
                assert_eq!(first_invalid, "b");
                assert_eq!(errors.invalid_fields(), vec!["b", "c"]);
            }
            SubmitOutcome::Submitted => panic!("expected a rejected submit"),
        }
        assert!(calls.borrow().is_empty());
        assert_eq!(session.state(), SubmitState::Invalid);
    }

    #[test]
    fn test_focus_goes_to_first_invalid_only() {
        let session = FormSession::builder().build();
        let focused = Rc::new(RefCell::new(Vec::new()));
        for name in ["a", "b", "c"] {
            let binding = session
                .register(name, FieldConstraints::text().required(name != "a"))
                .unwrap();
            let sink = Rc::clone(&focused);
            binding
                .on_focus(move || sink.borrow_mut().push(name))
                .unwrap();
        }
        let (mut controller, _) = recording_controller(&session);
        controller.submit(&mut HostSubmitEvent::new()).unwrap();
        assert_eq!(*focused.borrow(), vec!["b"]);
    }

    #[test]
    fn test_focus_can_be_disabled() {
        let settings = formwise_core::Settings {
            focus_first_error_on_submit: false,
            ..formwise_core::Settings::default()
        };
        let session = FormSession::builder().settings(&settings).build();
        let binding = session
            .register("a", FieldConstraints::text().required(true))
            .unwrap();
        let focused = Rc::new(RefCell::new(false));
        let sink = Rc::clone(&focused);
        binding.on_focus(move || *sink.borrow_mut() = true).unwrap();

        let (mut controller, _) = recording_controller(&session);
        let outcome = controller.submit(&mut HostSubmitEvent::new()).unwrap();
        assert!(!outcome.is_submitted());
        assert!(!*focused.borrow());
    }

    #[test]
    fn test_submit_from_inside_validator_is_rejected() {
        let session = FormSession::builder().build();
        session.register("a", FieldConstraints::text()).unwrap();
        session.transition(SubmitState::Validating).unwrap();
        let (mut controller, calls) = recording_controller(&session);
        let err = controller.submit(&mut HostSubmitEvent::new()).unwrap_err();
        assert!(matches!(err, FormwiseError::InvalidStateTransition { .. }));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_handler_may_edit_values() {
        let session = FormSession::builder().build();
        let name = session.register("name", FieldConstraints::text()).unwrap();
        let inner = name.clone();
        let mut controller = FormController::new(session.clone(), move |_| {
            inner.set_value("reset");
        });
        controller.submit(&mut HostSubmitEvent::new()).unwrap();
        assert_eq!(session.state(), SubmitState::Editing);
        assert_eq!(name.value().as_str(), Some("reset"));
    }

    #[test]
    fn test_transition_table() {
        use SubmitState::*;
        assert!(Pristine.can_transition_to(Editing));
        assert!(Pristine.can_transition_to(Validating));
        assert!(Validating.can_transition_to(Valid));
        assert!(Validating.can_transition_to(Invalid));
        assert!(Valid.can_transition_to(Submitting));
        assert!(Submitting.can_transition_to(Submitted));
        assert!(Submitted.can_transition_to(Validating));
        assert!(Invalid.can_transition_to(Editing));

        assert!(!Pristine.can_transition_to(Submitted));
        assert!(!Validating.can_transition_to(Validating));
        assert!(!Validating.can_transition_to(Editing));
        assert!(!Valid.can_transition_to(Editing));
        assert!(!Invalid.can_transition_to(Submitting));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SubmitState::Submitting.to_string(), "submitting");
        assert_eq!(SubmitState::default(), SubmitState::Pristine);
    }
}
