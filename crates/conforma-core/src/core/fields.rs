// crates/conforma-core/src/core/fields.rs
// ============================================================================
// Module: Conforma Form Fields
// Description: Structured form field values submitted to a driver.
// Purpose: Provide an explicit field map with typed optional accessors.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A form submission is a flat mapping of field name to string value plus
//! per-field metadata. The map is ordered (`BTreeMap`) so serialized
//! submissions are deterministic. [`FieldMap::get_or`] replaces the
//! duck-typed fixture accessors of the original suite with an explicit
//! default-returning lookup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Field Map
// ============================================================================

/// Ordered mapping of field name to submitted value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    /// Field values keyed by field name.
    values: BTreeMap<String, String>,
}

impl FieldMap {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field value, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value for a field, when present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns the value for a field, or the provided default when absent.
    #[must_use]
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Returns a copy with every value stripped of leading and trailing
    /// whitespace.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            values: self
                .values
                .iter()
                .map(|(name, value)| (name.clone(), value.trim().to_string()))
                .collect(),
        }
    }

    /// Returns whether the map holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of fields in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates over field name and value pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(name, value)| (name.into(), value.into())).collect(),
        }
    }
}

// ============================================================================
// SECTION: Form Field
// ============================================================================

/// Structured form field description: a plain data record, not a widget
/// hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Field name as labelled on the form.
    pub name: String,
    /// Current field value.
    pub value: String,
    /// Whether the field must be filled before submission.
    pub required: bool,
    /// Whether the field accepts input.
    pub enabled: bool,
}

impl FormField {
    /// Creates an enabled, optional field with the given name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            required: false,
            enabled: true,
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as read-only.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.enabled = false;
        self
    }
}
