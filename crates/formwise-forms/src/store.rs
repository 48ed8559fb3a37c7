//! Form state storage.
//!
//! The [`FormStore`] holds a form's values and errors behind a
//! [`StateBackend`]. The engine supports two ownership modes:
//!
//! - [`LocalState`]: the form owns its maps.
//! - [`ControlledState`]: the host owns the maps in shared cells and may
//!   observe every change through callbacks.
//!
//! The store only ever writes whole maps to the backend. Single-field updates
//! read the current map, change one key, and write the result back, so other
//! fields' entries are always preserved.
//!
//! Writes return a [`ChangeNotice`]. The caller delivers it once it no longer
//! holds the store, so a host listener may read the form back.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::value::{ErrorMessage, FieldValue, FormErrors, FormValues};

/// A host notification produced by a write, delivered later.
///
/// Dropping a notice without delivering it skips the notification.
#[must_use = "a change notice does nothing until delivered"]
#[derive(Default)]
pub struct ChangeNotice(Option<Box<dyn FnOnce()>>);

impl ChangeNotice {
    /// A notice with nothing to report.
    pub fn none() -> Self {
        Self(None)
    }

    fn new(notify: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(notify)))
    }

    /// Returns `true` if delivering this notice calls a listener.
    pub const fn is_pending(&self) -> bool {
        self.0.is_some()
    }

    /// Calls the listener, if any.
    pub fn deliver(self) {
        if let Some(notify) = self.0 {
            notify();
        }
    }
}

impl fmt::Debug for ChangeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChangeNotice").field(&self.is_pending()).finish()
    }
}

/// Where a form's values and errors live.
pub trait StateBackend {
    /// Returns a snapshot of the current values.
    fn values(&self) -> FormValues;

    /// Returns a snapshot of the current errors.
    fn errors(&self) -> FormErrors;

    /// Replaces the whole value map.
    fn replace_values(&mut self, values: FormValues) -> ChangeNotice;

    /// Replaces the whole error map.
    fn replace_errors(&mut self, errors: FormErrors) -> ChangeNotice;
}

/// State owned by the form itself.
#[derive(Debug, Clone, Default)]
pub struct LocalState {
    values: FormValues,
    errors: FormErrors,
}

impl LocalState {
    /// Creates local state seeded with the given maps.
    pub fn new(values: FormValues, errors: FormErrors) -> Self {
        Self { values, errors }
    }
}

impl StateBackend for LocalState {
    fn values(&self) -> FormValues {
        self.values.clone()
    }

    fn errors(&self) -> FormErrors {
        self.errors.clone()
    }

    fn replace_values(&mut self, values: FormValues) -> ChangeNotice {
        self.values = values;
        ChangeNotice::none()
    }

    fn replace_errors(&mut self, errors: FormErrors) -> ChangeNotice {
        self.errors = errors;
        ChangeNotice::none()
    }
}

type ChangeListener<T> = Rc<RefCell<dyn FnMut(&T)>>;

fn notice_for<T: 'static>(listener: Option<&ChangeListener<T>>, map: &T) -> ChangeNotice
where
    T: Clone,
{
    let Some(listener) = listener else {
        return ChangeNotice::none();
    };
    let listener = Rc::clone(listener);
    let map = map.clone();
    ChangeNotice::new(move || match listener.try_borrow_mut() {
        Ok(mut listener) => (*listener)(&map),
        Err(_) => tracing::trace!("change made inside its own listener is not reported again"),
    })
}

/// State owned by the host.
///
/// The host keeps clones of the value and error cells and reads them whenever
/// it renders. Change callbacks receive the new full map after each update and
/// run after the form has released its state, so they may read the form.
/// A change the callback itself causes is written but not reported to it again.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use formwise_forms::store::ControlledState;
/// use formwise_forms::value::{FormErrors, FormValues};
///
/// let values = Rc::new(RefCell::new(FormValues::new()));
/// let errors = Rc::new(RefCell::new(FormErrors::new()));
/// let state = ControlledState::new(Rc::clone(&values), Rc::clone(&errors))
///     .on_values_change(|values| println!("{} fields", values.len()));
/// ```
pub struct ControlledState {
    values: Rc<RefCell<FormValues>>,
    errors: Rc<RefCell<FormErrors>>,
    on_values_change: Option<ChangeListener<FormValues>>,
    on_errors_change: Option<ChangeListener<FormErrors>>,
}

impl ControlledState {
    /// Creates controlled state over host-owned cells.
    pub fn new(values: Rc<RefCell<FormValues>>, errors: Rc<RefCell<FormErrors>>) -> Self {
        Self {
            values,
            errors,
            on_values_change: None,
            on_errors_change: None,
        }
    }

    /// Sets the callback invoked after every value change.
    #[must_use]
    pub fn on_values_change(mut self, listener: impl FnMut(&FormValues) + 'static) -> Self {
        self.on_values_change = Some(Rc::new(RefCell::new(listener)));
        self
    }

    /// Sets the callback invoked after every error change.
    #[must_use]
    pub fn on_errors_change(mut self, listener: impl FnMut(&FormErrors) + 'static) -> Self {
        self.on_errors_change = Some(Rc::new(RefCell::new(listener)));
        self
    }
}

impl fmt::Debug for ControlledState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlledState")
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("on_values_change", &self.on_values_change.is_some())
            .field("on_errors_change", &self.on_errors_change.is_some())
            .finish()
    }
}

impl StateBackend for ControlledState {
    fn values(&self) -> FormValues {
        self.values.borrow().clone()
    }

    fn errors(&self) -> FormErrors {
        self.errors.borrow().clone()
    }

    fn replace_values(&mut self, values: FormValues) -> ChangeNotice {
        let notice = notice_for(self.on_values_change.as_ref(), &values);
        self.values.replace(values);
        notice
    }

    fn replace_errors(&mut self, errors: FormErrors) -> ChangeNotice {
        let notice = notice_for(self.on_errors_change.as_ref(), &errors);
        self.errors.replace(errors);
        notice
    }
}

/// A form's values and errors.
pub struct FormStore {
    backend: Box<dyn StateBackend>,
}

impl FormStore {
    /// Creates a store over the given backend.
    pub fn new(backend: impl StateBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Creates a self-owned store seeded with `values` and no errors.
    pub fn local(values: FormValues) -> Self {
        Self::new(LocalState::new(values, FormErrors::new()))
    }

    /// Returns a snapshot of every field's value.
    pub fn values(&self) -> FormValues {
        self.backend.values()
    }

    /// Returns a snapshot of every field's error.
    pub fn errors(&self) -> FormErrors {
        self.backend.errors()
    }

    /// Returns one field's value (`Absent` if it has none).
    pub fn value(&self, name: &str) -> FieldValue {
        self.backend.values().get(name).clone()
    }

    /// Returns one field's error (`""` if it has none).
    pub fn error(&self, name: &str) -> ErrorMessage {
        self.backend.errors().get(name).to_string()
    }

    /// Sets one field's value, keeping every other field's value.
    pub fn merge_value(&mut self, name: &str, value: FieldValue) -> ChangeNotice {
        let values = self.backend.values().with(name, value);
        self.backend.replace_values(values)
    }

    /// Sets one field's error, keeping every other field's error.
    pub fn merge_error(&mut self, name: &str, message: ErrorMessage) -> ChangeNotice {
        let mut errors = self.backend.errors();
        errors.insert(name, message);
        self.backend.replace_errors(errors)
    }

    /// Removes one field's error entry.
    pub fn remove_error(&mut self, name: &str) -> ChangeNotice {
        let mut errors = self.backend.errors();
        if errors.remove(name).is_some() {
            self.backend.replace_errors(errors)
        } else {
            ChangeNotice::none()
        }
    }

    /// Replaces the whole error map.
    pub fn replace_errors(&mut self, errors: FormErrors) -> ChangeNotice {
        self.backend.replace_errors(errors)
    }

    /// Returns `true` when every stored error is empty.
    ///
    /// Always computed from the current error map.
    pub fn is_valid(&self) -> bool {
        self.backend.errors().is_valid()
    }
}

impl fmt::Debug for FormStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStore")
            .field("values", &self.values())
            .field("errors", &self.errors())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_value_keeps_other_fields() {
        let mut store = FormStore::local(FormValues::new().with("a", "1").with("b", "2"));
        store.merge_error("b", "B is wrong".to_string()).deliver();
        store.merge_value("a", "3".into()).deliver();
        assert_eq!(store.value("a"), FieldValue::from("3"));
        assert_eq!(store.value("b"), FieldValue::from("2"));
        assert_eq!(store.error("b"), "B is wrong");
    }

    #[test]
    fn test_merge_error_keeps_other_fields() {
        let mut store = FormStore::local(FormValues::new());
        store.merge_error("a", "A".to_string()).deliver();
        store.merge_error("b", "B".to_string()).deliver();
        store.merge_error("a", String::new()).deliver();
        assert_eq!(store.error("a"), "");
        assert_eq!(store.error("b"), "B");
        assert_eq!(store.errors().len(), 2);
    }

    #[test]
    fn test_is_valid_tracks_errors() {
        let mut store = FormStore::local(FormValues::new());
        assert!(store.is_valid());
        store.merge_error("a", "A".to_string()).deliver();
        assert!(!store.is_valid());
        store.replace_errors(FormErrors::new()).deliver();
        assert!(store.is_valid());
    }

    #[test]
    fn test_remove_error() {
        let mut store = FormStore::local(FormValues::new());
        store.merge_error("a", "A".to_string()).deliver();
        store.remove_error("a").deliver();
        assert!(!store.errors().contains("a"));
    }

    #[test]
    fn test_controlled_state_writes_host_cells() {
        let values = Rc::new(RefCell::new(FormValues::new().with("kept", "yes")));
        let errors = Rc::new(RefCell::new(FormErrors::new()));
        let mut store = FormStore::new(ControlledState::new(Rc::clone(&values), Rc::clone(&errors)));

        store.merge_value("name", "Ann".into()).deliver();
        store.merge_error("name", "Too short".to_string()).deliver();

        assert_eq!(values.borrow().get("name"), &FieldValue::from("Ann"));
        assert_eq!(values.borrow().get("kept"), &FieldValue::from("yes"));
        assert_eq!(errors.borrow().get("name"), "Too short");
    }

    #[test]
    fn test_controlled_state_reads_host_edits() {
        let values = Rc::new(RefCell::new(FormValues::new()));
        let errors = Rc::new(RefCell::new(FormErrors::new()));
        let store = FormStore::new(ControlledState::new(Rc::clone(&values), Rc::clone(&errors)));

        values.borrow_mut().insert("name", "Set by host");
        assert_eq!(store.value("name"), FieldValue::from("Set by host"));
    }

    #[test]
    fn test_controlled_state_notifies_listeners() {
        let seen_values = Rc::new(RefCell::new(Vec::new()));
        let seen_errors = Rc::new(RefCell::new(Vec::new()));
        let state = ControlledState::new(
            Rc::new(RefCell::new(FormValues::new())),
            Rc::new(RefCell::new(FormErrors::new())),
        )
        .on_values_change({
            let seen = Rc::clone(&seen_values);
            move |values| seen.borrow_mut().push(values.len())
        })
        .on_errors_change({
            let seen = Rc::clone(&seen_errors);
            move |errors| seen.borrow_mut().push(errors.is_valid())
        });
        let mut store = FormStore::new(state);

        store.merge_value("a", "1".into()).deliver();
        store.merge_value("b", "2".into()).deliver();
        store.merge_error("a", "A".to_string()).deliver();

        assert_eq!(*seen_values.borrow(), vec![1, 2]);
        assert_eq!(*seen_errors.borrow(), vec![false]);
    }

    #[test]
    fn test_local_writes_have_nothing_to_report() {
        let mut store = FormStore::local(FormValues::new());
        assert!(!store.merge_value("a", "1".into()).is_pending());
        assert!(!store.remove_error("a").is_pending());
    }

    #[test]
    fn test_listener_runs_only_on_delivery() {
        let values = Rc::new(RefCell::new(FormValues::new()));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let state = ControlledState::new(Rc::clone(&values), Rc::new(RefCell::new(FormErrors::new())))
            .on_values_change({
                let cell = Rc::clone(&values);
                let seen = Rc::clone(&seen);
                move |new_values| {
                    assert_eq!(*cell.borrow(), *new_values);
                    seen.borrow_mut().push(new_values.len());
                }
            });
        let mut store = FormStore::new(state);

        let notice = store.merge_value("a", "1".into());
        assert!(notice.is_pending());
        assert!(seen.borrow().is_empty());
        assert_eq!(values.borrow().get("a"), &FieldValue::from("1"));

        notice.deliver();
        assert_eq!(*seen.borrow(), vec![1]);
    }
}
