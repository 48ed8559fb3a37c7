//! Field values, value maps, and error maps.
//!
//! A form holds two maps keyed by field name: the current [`FormValues`] and
//! the current [`FormErrors`]. Both are updated one key at a time (a merge)
//! except for the submit sweep, which replaces the whole error map.
//!
//! Error messages are plain strings, with the empty string meaning "no error".
//! A field missing from [`FormErrors`] reads the same as a field whose entry
//! is empty, so validity is a single emptiness check over the map.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The name identifying one field within a form.
pub type FieldName = String;

/// A field error message. Empty means the field is valid.
pub type ErrorMessage = String;

const ABSENT: &FieldValue = &FieldValue::Absent;

/// The current value of one field.
///
/// `Absent` is distinct from `Text(String::new())`: the former means the
/// field has never held a value, the latter that it holds the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A text value.
    Text(String),
    /// A numeric value.
    Number(f64),
    /// An ordered sequence of strings (multi-selects, checkbox groups).
    List(Vec<String>),
    /// No value at all.
    #[default]
    Absent,
}

impl FieldValue {
    /// Returns `true` for `Absent`, empty text, and empty lists.
    ///
    /// This is what a required constraint treats as "no value".
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Number(_) => false,
            Self::List(items) => items.is_empty(),
            Self::Absent => true,
        }
    }

    /// Returns `true` only for `Absent`.
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns the value as the text an input control would display.
    ///
    /// Numbers use their shortest decimal form, lists are joined with `,`,
    /// and `Absent` renders as the empty string.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::List(items) => items.join(","),
            Self::Absent => String::new(),
        }
    }

    /// Returns the text if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a number, parsing text if needed.
    ///
    /// Returns `None` for lists, `Absent`, and text that is not a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::List(_) | Self::Absent => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// The current values of every field in a form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(HashMap<FieldName, FieldValue>);

impl FormValues {
    /// Creates an empty value map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `name`, or `Absent` if the map has no entry.
    pub fn get(&self, name: &str) -> &FieldValue {
        self.0.get(name).unwrap_or(ABSENT)
    }

    /// Sets one field's value, keeping every other entry.
    pub fn insert(&mut self, name: impl Into<FieldName>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns a copy of this map with one field's value set.
    #[must_use]
    pub fn with(mut self, name: impl Into<FieldName>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Removes a field's entry, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    /// Returns `true` if the map has an entry for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<FieldName>, V: Into<FieldValue>> FromIterator<(K, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FormValues {
    type Item = (FieldName, FieldValue);
    type IntoIter = std::collections::hash_map::IntoIter<FieldName, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The current error message of every field, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(HashMap<FieldName, ErrorMessage>);

impl FormErrors {
    /// Creates an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the message for `name`, or `""` if the map has no entry.
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map_or("", String::as_str)
    }

    /// Sets one field's message, keeping every other entry.
    pub fn insert(&mut self, name: impl Into<FieldName>, message: impl Into<ErrorMessage>) {
        self.0.insert(name.into(), message.into());
    }

    /// Removes a field's entry, returning its message.
    pub fn remove(&mut self, name: &str) -> Option<ErrorMessage> {
        self.0.remove(name)
    }

    /// Returns `true` if the map has an entry for `name`, even an empty one.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns `true` when every message is empty.
    pub fn is_valid(&self) -> bool {
        self.0.values().all(String::is_empty)
    }

    /// Returns the names of fields with a non-empty message, sorted.
    pub fn invalid_fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .0
            .iter()
            .filter(|(_, msg)| !msg.is_empty())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Returns the first name in `order` whose message is non-empty.
    pub fn first_invalid<'a, I>(&self, order: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        order.into_iter().find(|name| !self.get(name).is_empty())
    }

    /// Returns the number of entries, including empty ones.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, message)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<FieldName>, V: Into<ErrorMessage>> FromIterator<(K, V)> for FormErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
