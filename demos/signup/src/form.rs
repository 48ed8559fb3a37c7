//! The signup form: a required email, an optional CC address that must differ
//! from it, an optional website, and a required name.

use std::cell::RefCell;
use std::rc::Rc;

use formwise_core::FormwiseResult;
use formwise_forms::{
    FieldBinding, FieldConstraints, FieldValue, FormController, FormSession, FormValues,
    ValidatorRegistry,
};

/// The signup form's field names, in render order.
pub const FIELDS: [&str; 4] = ["email", "emailCc", "website", "name"];

/// Builds the signup form's validators.
pub fn validators() -> ValidatorRegistry {
    ValidatorRegistry::new()
        .with("email", |value: &FieldValue, _: &FormValues| {
            if value.as_str() == Some("llama@gmail.com") {
                "Pick a different email ya jabroni".to_string()
            } else {
                String::new()
            }
        })
        .with("emailCc", |value: &FieldValue, all: &FormValues| {
            // The input reports its text, so an untouched CC reads as "".
            if FieldValue::from(value.as_text()) == *all.get("email") {
                "please provide a different email than the main email".to_string()
            } else {
                String::new()
            }
        })
}

/// A mounted signup form.
pub struct SignupForm {
    pub session: FormSession,
    pub controller: FormController,
    pub fields: Vec<FieldBinding>,
    pub submitted: Rc<RefCell<Option<FormValues>>>,
}

impl SignupForm {
    /// Mounts the form and registers every field.
    pub fn mount() -> FormwiseResult<Self> {
        let session = FormSession::new(validators());
        let fields = vec![
            session.register("email", FieldConstraints::email().required(true))?,
            session.register("emailCc", FieldConstraints::email())?,
            session.register("website", FieldConstraints::url())?,
            session.register("name", FieldConstraints::text().required(true))?,
        ];
        for field in &fields {
            let name = field.name().to_string();
            field.on_focus(move || tracing::info!(field = %name, "focus moved"))?;
        }

        let submitted = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&submitted);
        let controller = FormController::new(session.clone(), move |values| {
            *sink.borrow_mut() = Some(values);
        });

        Ok(Self {
            session,
            controller,
            fields,
            submitted,
        })
    }

    /// Types `value` into the named field and leaves it, as a user would.
    pub fn fill(&self, name: &str, value: Option<&str>) {
        if let Some(field) = self.fields.iter().find(|field| field.name() == name) {
            field.set_value(value);
            field.blur();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwise_forms::HostSubmitEvent;

    #[test]
    fn test_fields_render_in_order() {
        let form = SignupForm::mount().unwrap();
        assert_eq!(form.session.field_names(), FIELDS);
    }

    #[test]
    fn test_fill_validates_on_blur() {
        let form = SignupForm::mount().unwrap();
        form.fill("email", Some("llama@gmail.com"));
        assert_eq!(form.session.error("email"), "Pick a different email ya jabroni");
        form.fill("email", None);
        assert_eq!(form.session.error("email"), "This field is required");
    }

    #[test]
    fn test_valid_submit_records_values() {
        let mut form = SignupForm::mount().unwrap();
        form.fill("email", Some("ann@example.com"));
        form.fill("name", Some("Ann"));
        let outcome = form.controller.submit(&mut HostSubmitEvent::new()).unwrap();
        assert!(outcome.is_submitted());
        let submitted = form.submitted.borrow();
        let values = submitted.as_ref().unwrap();
        assert_eq!(values.get("name"), &FieldValue::from("Ann"));
        assert!(values.get("website").is_absent());
    }
}
