//! The ordered set of fields currently present in a form.
//!
//! Bindings add their field here when they are created and remove it on
//! teardown. The submit sweep walks the registry in registration order, so
//! fields without a validator are still baseline-checked.

use std::rc::Rc;

use formwise_core::{FormwiseError, FormwiseResult};

use crate::constraints::ConstraintSource;
use crate::value::FieldName;

/// The host's way of moving input focus to a field.
pub type FocusHandler = Rc<dyn Fn()>;

/// One registered field.
#[derive(Clone)]
pub(crate) struct RegisteredField {
    pub(crate) name: FieldName,
    pub(crate) constraints: Rc<dyn ConstraintSource>,
    pub(crate) focus: Option<FocusHandler>,
}

#[derive(Clone, Default)]
pub(crate) struct FieldRegistry {
    fields: Vec<RegisteredField>,
}

impl FieldRegistry {
    pub(crate) fn insert(
        &mut self,
        name: &str,
        constraints: Rc<dyn ConstraintSource>,
    ) -> FormwiseResult<()> {
        if self.contains(name) {
            return Err(FormwiseError::DuplicateField(name.to_string()));
        }
        self.fields.push(RegisteredField {
            name: name.to_string(),
            constraints,
            focus: None,
        });
        Ok(())
    }

    pub(crate) fn remove(&mut self, name: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|field| field.name != name);
        self.fields.len() != before
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&RegisteredField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub(crate) fn set_focus(&mut self, name: &str, handler: FocusHandler) -> FormwiseResult<()> {
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.name == name)
            .ok_or_else(|| FormwiseError::UnknownField(name.to_string()))?;
        field.focus = Some(handler);
        Ok(())
    }

    pub(crate) fn names(&self) -> Vec<FieldName> {
        self.fields.iter().map(|field| field.name.clone()).collect()
    }

    pub(crate) fn fields(&self) -> &[RegisteredField] {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::FieldConstraints;

    fn source() -> Rc<dyn ConstraintSource> {
        Rc::new(FieldConstraints::text())
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = FieldRegistry::default();
        registry.insert("b", source()).unwrap();
        registry.insert("a", source()).unwrap();
        registry.insert("c", source()).unwrap();
        assert_eq!(registry.names(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let mut registry = FieldRegistry::default();
        registry.insert("a", source()).unwrap();
        let err = registry.insert("a", source()).unwrap_err();
        assert!(matches!(err, FormwiseError::DuplicateField(name) if name == "a"));
        assert_eq!(registry.fields().len(), 1);
    }

    #[test]
    fn test_remove_then_reinsert_goes_last() {
        let mut registry = FieldRegistry::default();
        registry.insert("a", source()).unwrap();
        registry.insert("b", source()).unwrap();
        assert!(registry.remove("a"));
        assert!(!registry.remove("a"));
        registry.insert("a", source()).unwrap();
        assert_eq!(registry.names(), vec!["b", "a"]);
    }

    #[test]
    fn test_set_focus_unknown_field() {
        let mut registry = FieldRegistry::default();
        let err = registry.set_focus("ghost", Rc::new(|| {})).unwrap_err();
        assert!(matches!(err, FormwiseError::UnknownField(_)));
    }

    #[test]
    fn test_set_focus_known_field() {
        let mut registry = FieldRegistry::default();
        registry.insert("a", source()).unwrap();
        registry.set_focus("a", Rc::new(|| {})).unwrap();
        assert!(registry.get("a").unwrap().focus.is_some());
    }
}
