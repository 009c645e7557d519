// crates/conforma-core/src/core/identifiers.rs
// ============================================================================
// Module: Conforma Identifiers
// Description: Canonical resource names with normalization and hierarchy.
// Purpose: Provide strongly typed names with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical resource name used throughout Conforma.
//! Names are stored verbatim; comparison and persistence always go through
//! [`ResourceName::normalized`], which trims leading and trailing whitespace.
//! Hierarchy is encoded with the `/` separator: `"Europe/Latvia"` denotes
//! `Latvia` nested under `Europe`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path separator encoding resource hierarchy inside a name.
pub const NAME_SEPARATOR: char = '/';

/// Escape prefix that suppresses a separator inside a name segment.
const NAME_ESCAPE: char = '\\';

// ============================================================================
// SECTION: Resource Name
// ============================================================================

/// Human-readable resource key, unique within a repository after
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    /// Creates a new resource name, keeping the raw value verbatim.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the raw name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the normalized form: leading and trailing whitespace trimmed.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self(self.0.trim().to_string())
    }

    /// Validates the normalized name against the registry naming rules.
    ///
    /// # Errors
    ///
    /// Returns [`NameViolation::Empty`] for empty or whitespace-only names and
    /// [`NameViolation::InvalidSegment`] for names with empty path segments or
    /// an escaped separator.
    pub fn validate(&self) -> Result<(), NameViolation> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            return Err(NameViolation::Empty);
        }
        let mut escape = String::new();
        escape.push(NAME_ESCAPE);
        escape.push(NAME_SEPARATOR);
        if trimmed.contains(&escape) {
            return Err(NameViolation::InvalidSegment);
        }
        if trimmed.split(NAME_SEPARATOR).any(str::is_empty) {
            return Err(NameViolation::InvalidSegment);
        }
        Ok(())
    }

    /// Returns the parent name when the normalized name is nested.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let normalized = self.0.trim();
        normalized
            .rfind(NAME_SEPARATOR)
            .map(|idx| Self(normalized[..idx].to_string()))
    }

    /// Returns whether this name sits strictly below `ancestor` in the
    /// hierarchy.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Self) -> bool {
        let child = self.0.trim();
        let parent = ancestor.0.trim();
        child.len() > parent.len() + 1
            && child.starts_with(parent)
            && child[parent.len()..].starts_with(NAME_SEPARATOR)
    }

    /// Returns the normalized name segments split on the separator.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        self.0.trim().split(NAME_SEPARATOR).collect()
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ResourceName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Name Violations
// ============================================================================

/// Static naming-rule violations detected before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameViolation {
    /// The name is empty after trimming.
    Empty,
    /// The name contains an empty path segment or a dangling escape.
    InvalidSegment,
}
