//! Baseline constraint validation.
//!
//! Hosts describe each field's declared constraints (required, input type,
//! numeric range, length, pattern) through the [`ConstraintSource`] trait. The
//! engine never inspects a field directly; it asks the source for a
//! [`ValidityState`] and the [`NativeConstraintAdapter`] classifies that state
//! into a [`BaselineViolation`] and its message.
//!
//! [`FieldConstraints`] is the built-in source. Hosts with their own platform
//! validity API (a browser element, a toolkit widget) implement
//! [`ConstraintSource`] over it instead.

use std::fmt;
use std::rc::Rc;

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;

use formwise_core::settings::MessageSettings;

use crate::value::{ErrorMessage, FieldValue};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid regex")
});

/// The declared kind of an input control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputKind {
    /// `<input type="text">`.
    #[default]
    Text,
    /// `<input type="search">`.
    Search,
    /// `<input type="tel">`.
    Tel,
    /// `<input type="url">`.
    Url,
    /// `<input type="email">`.
    Email,
    /// `<input type="password">`.
    Password,
    /// `<input type="number">`.
    Number,
    /// `<input type="range">`.
    Range,
    /// `<input type="date">`.
    Date,
    /// `<input type="checkbox">`.
    Checkbox,
    /// `<input type="radio">`.
    Radio,
    /// `<input type="hidden">`.
    Hidden,
    /// `<input type="file">`.
    File,
    /// `<input type="submit">`.
    Submit,
    /// `<input type="reset">`.
    Reset,
    /// `<input type="button">`.
    Button,
    /// `<textarea>`.
    Textarea,
    /// `<select>`.
    Select,
}

impl InputKind {
    /// Parses an HTML input type name. Unknown names are treated as text.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Self::Search,
            "tel" => Self::Tel,
            "url" => Self::Url,
            "email" => Self::Email,
            "password" => Self::Password,
            "number" => Self::Number,
            "range" => Self::Range,
            "date" => Self::Date,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "hidden" => Self::Hidden,
            "file" => Self::File,
            "submit" => Self::Submit,
            "reset" => Self::Reset,
            "button" => Self::Button,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            _ => Self::Text,
        }
    }

    /// Returns `true` for controls that are never baseline-checked:
    /// file uploads, reset, submit, and button controls.
    pub const fn is_exempt(self) -> bool {
        matches!(self, Self::File | Self::Reset | Self::Submit | Self::Button)
    }

    /// Returns `true` for kinds whose value is free text, where length and
    /// pattern constraints apply.
    pub const fn is_textual(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Search
                | Self::Tel
                | Self::Url
                | Self::Email
                | Self::Password
                | Self::Textarea
        )
    }

    /// Returns `true` for numeric kinds, where range and step constraints apply.
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Number | Self::Range)
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Search => "search",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Range => "range",
            Self::Date => "date",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Hidden => "hidden",
            Self::File => "file",
            Self::Submit => "submit",
            Self::Reset => "reset",
            Self::Button => "button",
            Self::Textarea => "textarea",
            Self::Select => "select",
        };
        f.write_str(name)
    }
}

/// Which declared constraints a value fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityState {
    /// A required field has no value.
    pub value_missing: bool,
    /// The value does not match the declared type (email, url).
    pub type_mismatch: bool,
    /// The value does not match the declared pattern.
    pub pattern_mismatch: bool,
    /// The value is longer than the declared maximum length.
    pub too_long: bool,
    /// The value is shorter than the declared minimum length.
    pub too_short: bool,
    /// The value is below the declared minimum.
    pub range_underflow: bool,
    /// The value is above the declared maximum.
    pub range_overflow: bool,
    /// The value is not a whole number of steps from the step base.
    pub step_mismatch: bool,
    /// The value cannot be interpreted for the declared kind.
    pub bad_input: bool,
}

impl ValidityState {
    /// Returns `true` when no flag is set.
    pub const fn is_valid(&self) -> bool {
        !(self.value_missing
            || self.type_mismatch
            || self.pattern_mismatch
            || self.too_long
            || self.too_short
            || self.range_underflow
            || self.range_overflow
            || self.step_mismatch
            || self.bad_input)
    }
}

/// The host capability for checking a field's baseline constraints.
///
/// Implementations must be pure: the same value yields the same validity.
pub trait ConstraintSource {
    /// Returns the declared kind of the control.
    fn kind(&self) -> InputKind;

    /// Returns `true` if the control is disabled. Disabled fields are never
    /// baseline-checked.
    fn is_disabled(&self) -> bool {
        false
    }

    /// Reports which declared constraints `value` fails.
    fn validity(&self, value: &FieldValue) -> ValidityState;
}

/// A field's declared baseline constraints.
///
/// Numeric kinds get a default step of `1`, matching HTML; call
/// [`step_any`](Self::step_any) to allow fractional values.
///
/// # Examples
///
/// ```
/// use formwise_forms::constraints::{ConstraintSource, FieldConstraints, InputKind};
///
/// let puppies = FieldConstraints::new(InputKind::Number).min(3.0);
/// assert!(puppies.validity(&"1".into()).range_underflow);
/// assert!(puppies.validity(&"4".into()).is_valid());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldConstraints {
    /// The declared kind.
    pub kind: InputKind,
    /// Whether a value is required.
    pub required: bool,
    /// Whether the control is disabled.
    pub disabled: bool,
    /// Minimum numeric value.
    pub min: Option<f64>,
    /// Maximum numeric value.
    pub max: Option<f64>,
    /// Step granularity; `None` allows any value.
    pub step: Option<f64>,
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    pattern: Option<String>,
    compiled_pattern: OnceCell<Option<Regex>>,
}

impl FieldConstraints {
    /// Creates constraints for a control of the given kind with nothing else declared.
    pub fn new(kind: InputKind) -> Self {
        Self {
            kind,
            step: kind.is_numeric().then_some(1.0),
            ..Self::default()
        }
    }

    /// Creates constraints for a plain text control.
    pub fn text() -> Self {
        Self::new(InputKind::Text)
    }

    /// Creates constraints for an email control.
    pub fn email() -> Self {
        Self::new(InputKind::Email)
    }

    /// Creates constraints for a URL control.
    pub fn url() -> Self {
        Self::new(InputKind::Url)
    }

    /// Creates constraints for a number control.
    pub fn number() -> Self {
        Self::new(InputKind::Number)
    }

    /// Sets whether a value is required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets whether the control is disabled.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets the minimum numeric value.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets the maximum numeric value.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Sets the step granularity.
    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Allows any numeric value regardless of step.
    #[must_use]
    pub fn step_any(mut self) -> Self {
        self.step = None;
        self
    }

    /// Sets the minimum length in characters.
    #[must_use]
    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    /// Sets the maximum length in characters.
    #[must_use]
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets a pattern the whole value must match.
    ///
    /// A pattern that is not a valid regular expression is ignored.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self.compiled_pattern = OnceCell::new();
        self
    }

    /// Returns the declared pattern, if any.
    pub fn pattern_source(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    fn compiled_pattern(&self) -> Option<&Regex> {
        self.compiled_pattern
            .get_or_init(|| {
                let pattern = self.pattern.as_deref()?;
                match Regex::new(&format!("^(?:{pattern})$")) {
                    Ok(re) => Some(re),
                    Err(err) => {
                        tracing::warn!(pattern, error = %err, "ignoring invalid field pattern");
                        None
                    }
                }
            })
            .as_ref()
    }

    fn check_numeric(&self, value: &FieldValue, state: &mut ValidityState) {
        let Some(n) = value.as_number().filter(|n| n.is_finite()) else {
            state.bad_input = true;
            return;
        };
        if self.min.is_some_and(|min| n < min) {
            state.range_underflow = true;
        }
        if self.max.is_some_and(|max| n > max) {
            state.range_overflow = true;
        }
        if let Some(step) = self.step.filter(|step| *step > 0.0) {
            let base = self.min.unwrap_or(0.0);
            let steps = (n - base) / step;
            if (steps - steps.round()).abs() > 1e-9 {
                state.step_mismatch = true;
            }
        }
    }

    fn check_textual(&self, text: &str, state: &mut ValidityState) {
        match self.kind {
            InputKind::Email => state.type_mismatch = !EMAIL_RE.is_match(text),
            InputKind::Url => state.type_mismatch = url::Url::parse(text).is_err(),
            _ => {}
        }
        let len = text.chars().count();
        if self.min_length.is_some_and(|min| len < min) {
            state.too_short = true;
        }
        if self.max_length.is_some_and(|max| len > max) {
            state.too_long = true;
        }
        if let Some(re) = self.compiled_pattern() {
            state.pattern_mismatch = !re.is_match(text);
        }
    }
}

impl ConstraintSource for FieldConstraints {
    fn kind(&self) -> InputKind {
        self.kind
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn validity(&self, value: &FieldValue) -> ValidityState {
        let mut state = ValidityState::default();
        if self.kind == InputKind::Hidden || self.kind.is_exempt() {
            return state;
        }
        if value.is_empty() {
            state.value_missing = self.required;
            return state;
        }
        if self.kind.is_numeric() {
            self.check_numeric(value, &mut state);
        } else if self.kind.is_textual() {
            self.check_textual(&value.as_text(), &mut state);
        }
        state
    }
}

impl<T: ConstraintSource + ?Sized> ConstraintSource for Rc<T> {
    fn kind(&self) -> InputKind {
        (**self).kind()
    }

    fn is_disabled(&self) -> bool {
        (**self).is_disabled()
    }

    fn validity(&self, value: &FieldValue) -> ValidityState {
        (**self).validity(value)
    }
}

/// Why a field fails its baseline constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineViolation {
    /// A required field has no value.
    RequiredMissing,
    /// The value does not match the declared kind.
    TypeMismatch(InputKind),
    /// Any other baseline failure (range, step, length, pattern, bad input).
    ConstraintOther,
}

impl BaselineViolation {
    /// Returns the message for this violation.
    ///
    /// Type mismatches on kinds with no dedicated message use the fallback.
    pub fn message(self, messages: &MessageSettings) -> &str {
        match self {
            Self::RequiredMissing => &messages.required,
            Self::TypeMismatch(InputKind::Email) => &messages.email,
            Self::TypeMismatch(InputKind::Url) => &messages.url,
            Self::TypeMismatch(_) | Self::ConstraintOther => &messages.fallback,
        }
    }
}

/// Classifies a field's baseline validity into a [`BaselineViolation`].
///
/// Exempt kinds and disabled fields always pass.
pub fn classify(source: &dyn ConstraintSource, value: &FieldValue) -> Option<BaselineViolation> {
    let kind = source.kind();
    if kind.is_exempt() || source.is_disabled() {
        return None;
    }
    let validity = source.validity(value);
    if validity.is_valid() {
        None
    } else if validity.value_missing {
        Some(BaselineViolation::RequiredMissing)
    } else if validity.type_mismatch {
        Some(BaselineViolation::TypeMismatch(kind))
    } else {
        Some(BaselineViolation::ConstraintOther)
    }
}

/// Turns baseline validity into an error message.
#[derive(Debug, Clone, Default)]
pub struct NativeConstraintAdapter {
    messages: Rc<MessageSettings>,
}

impl NativeConstraintAdapter {
    /// Creates an adapter reporting the given messages.
    pub fn new(messages: MessageSettings) -> Self {
        Self {
            messages: Rc::new(messages),
        }
    }

    /// Returns the messages this adapter reports.
    pub fn messages(&self) -> &MessageSettings {
        &self.messages
    }

    /// Checks `value` against the source's constraints.
    ///
    /// Returns `""` when the field is exempt, disabled, or satisfies every
    /// declared constraint.
    pub fn check(&self, source: &dyn ConstraintSource, value: &FieldValue) -> ErrorMessage {
        classify(source, value)
            .map(|violation| violation.message(&self.messages).to_string())
            .unwrap_or_default()
    }
}
