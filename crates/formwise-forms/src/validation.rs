//! Validation pipeline for a single field.
//!
//! A field's error is computed in two steps:
//! 1. The caller-supplied [`Validator`] registered for the field runs against
//!    the field's value and the full current value set.
//! 2. If the validator returns an empty message, the field's baseline
//!    constraints are checked through the [`NativeConstraintAdapter`].
//!
//! A non-empty custom message always wins, so a business rule can replace a
//! baseline message. It cannot see the baseline result: validators only ever
//! receive raw values.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::constraints::{classify, BaselineViolation, ConstraintSource, NativeConstraintAdapter};
use crate::value::{ErrorMessage, FieldName, FieldValue, FormValues};

/// A caller-supplied business rule for one field.
///
/// Receives the field's value and every field's current value and returns an
/// error message, empty when the value is acceptable. Validators must be pure.
/// A panicking validator is a bug in the caller and is not caught.
pub type Validator = Rc<dyn Fn(&FieldValue, &FormValues) -> ErrorMessage>;

/// Returns the validator used for fields with nothing registered.
pub fn always_valid() -> Validator {
    Rc::new(|_, _| ErrorMessage::new())
}

/// The validators of one form, keyed by field name.
///
/// # Examples
///
/// ```
/// use formwise_forms::validation::ValidatorRegistry;
/// use formwise_forms::value::{FieldValue, FormValues};
///
/// let registry = ValidatorRegistry::new().with("email", |value, _| {
///     if value.as_str() == Some("llama@gmail.com") {
///         "Pick a different email ya jabroni".to_string()
///     } else {
///         String::new()
///     }
/// });
/// let check = registry.get("email");
/// assert!(!check(&FieldValue::from("llama@gmail.com"), &FormValues::new()).is_empty());
/// ```
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<FieldName, Validator>,
}

impl ValidatorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validator for `name`, replacing any previous one.
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<FieldName>, validator: F) -> Self
    where
        F: Fn(&FieldValue, &FormValues) -> ErrorMessage + 'static,
    {
        self.insert(name, validator);
        self
    }

    /// Adds a validator for `name`, replacing any previous one.
    pub fn insert<F>(&mut self, name: impl Into<FieldName>, validator: F)
    where
        F: Fn(&FieldValue, &FormValues) -> ErrorMessage + 'static,
    {
        self.validators.insert(name.into(), Rc::new(validator));
    }

    /// Returns the validator for `name`, or [`always_valid`] if none is registered.
    pub fn get(&self, name: &str) -> Validator {
        match self.validators.get(name) {
            Some(validator) => Rc::clone(validator),
            None => always_valid(),
        }
    }

    /// Returns `true` if a validator is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Returns the number of registered validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns `true` if no validators are registered.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("fields", &names)
            .finish()
    }
}

/// Why a field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The field failed a baseline constraint.
    Baseline(BaselineViolation),
    /// The field's custom validator rejected the value with this message.
    CustomRuleViolation(String),
}

impl ValidationFailure {
    /// Returns the message shown for this failure.
    pub fn message(&self, adapter: &NativeConstraintAdapter) -> ErrorMessage {
        match self {
            Self::Baseline(violation) => violation.message(adapter.messages()).to_string(),
            Self::CustomRuleViolation(message) => message.clone(),
        }
    }
}

/// Combines custom validators with baseline constraint checks.
#[derive(Debug, Clone, Default)]
pub struct ValidationPipeline {
    validators: Rc<ValidatorRegistry>,
    adapter: NativeConstraintAdapter,
}

impl ValidationPipeline {
    /// Creates a pipeline over the given validators and adapter.
    pub fn new(validators: ValidatorRegistry, adapter: NativeConstraintAdapter) -> Self {
        Self {
            validators: Rc::new(validators),
            adapter,
        }
    }

    /// Returns the registered validators.
    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Replaces the registered validators.
    pub fn set_validators(&mut self, validators: ValidatorRegistry) {
        self.validators = Rc::new(validators);
    }

    /// Returns the baseline adapter.
    pub const fn adapter(&self) -> &NativeConstraintAdapter {
        &self.adapter
    }

    /// Evaluates one field and reports why it fails, if it does.
    ///
    /// `source` is the field's baseline constraint capability; with `None`
    /// only the custom validator runs.
    pub fn evaluate(
        &self,
        name: &str,
        value: &FieldValue,
        all_values: &FormValues,
        source: Option<&dyn ConstraintSource>,
    ) -> Option<ValidationFailure> {
        let validator = self.validators.get(name);
        let custom = validator(value, all_values);
        if !custom.is_empty() {
            return Some(ValidationFailure::CustomRuleViolation(custom));
        }
        source
            .and_then(|source| classify(source, value))
            .map(ValidationFailure::Baseline)
    }

    /// Validates one field and returns its error message (empty when valid).
    pub fn validate(
        &self,
        name: &str,
        value: &FieldValue,
        all_values: &FormValues,
        source: Option<&dyn ConstraintSource>,
    ) -> ErrorMessage {
        let message = self
            .evaluate(name, value, all_values, source)
            .map(|failure| failure.message(&self.adapter))
            .unwrap_or_default();
        tracing::trace!(field = name, error = %message, "validated field");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::FieldConstraints;

    fn registry() -> ValidatorRegistry {
        ValidatorRegistry::new()
            .with("email", |value, _| {
                if value.as_str() == Some("llama@gmail.com") {
                    "Pick a different email ya jabroni".to_string()
                } else {
                    String::new()
                }
            })
            .with("emailCc", |value, all| {
                if value == all.get("email") {
                    "please provide a different email than the main email".to_string()
                } else {
                    String::new()
                }
            })
    }

    fn pipeline() -> ValidationPipeline {
        ValidationPipeline::new(registry(), NativeConstraintAdapter::default())
    }

    #[test]
    fn test_unregistered_field_uses_always_valid() {
        let registry = registry();
        assert!(!registry.contains("name"));
        let validator = registry.get("name");
        assert_eq!(validator(&FieldValue::from("anything"), &FormValues::new()), "");
    }

    #[test]
    fn test_custom_takes_precedence_over_baseline() {
        let source = FieldConstraints::email().required(true);
        let message = pipeline().validate(
            "email",
            &"llama@gmail.com".into(),
            &FormValues::new(),
            Some(&source),
        );
        assert_eq!(message, "Pick a different email ya jabroni");
    }

    #[test]
    fn test_custom_overrides_baseline_failure() {
        let pipeline = ValidationPipeline::new(
            ValidatorRegistry::new().with("age", |_, _| "Ask a grown-up".to_string()),
            NativeConstraintAdapter::default(),
        );
        let source = FieldConstraints::number().required(true);
        let failure = pipeline.evaluate("age", &FieldValue::Absent, &FormValues::new(), Some(&source));
        assert_eq!(
            failure,
            Some(ValidationFailure::CustomRuleViolation("Ask a grown-up".into()))
        );
    }

    #[test]
    fn test_baseline_runs_when_custom_passes() {
        let source = FieldConstraints::email().required(true);
        let failure = pipeline().evaluate("email", &"".into(), &FormValues::new(), Some(&source));
        assert_eq!(
            failure,
            Some(ValidationFailure::Baseline(BaselineViolation::RequiredMissing))
        );
    }

    #[test]
    fn test_validator_sees_all_values() {
        let all = FormValues::new()
            .with("email", "a@b.com")
            .with("emailCc", "a@b.com");
        let message = pipeline().validate(
            "emailCc",
            all.get("emailCc"),
            &all,
            Some(&FieldConstraints::email()),
        );
        assert_eq!(message, "please provide a different email than the main email");
    }

    #[test]
    fn test_no_source_runs_only_custom() {
        let message = pipeline().validate("name", &"".into(), &FormValues::new(), None);
        assert_eq!(message, "");
    }

    #[test]
    fn test_set_validators_swaps_registry() {
        let mut pipeline = pipeline();
        assert_eq!(pipeline.validators().len(), 2);
        pipeline.set_validators(ValidatorRegistry::new());
        assert!(pipeline.validators().is_empty());
        let message = pipeline.validate(
            "email",
            &"llama@gmail.com".into(),
            &FormValues::new(),
            None,
        );
        assert_eq!(message, "");
    }

    #[test]
    fn test_registry_debug_lists_fields() {
        let debug = format!("{:?}", registry());
        assert!(debug.contains("email"));
        assert!(debug.contains("emailCc"));
    }
}
