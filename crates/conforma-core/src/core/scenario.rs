// crates/conforma-core/src/core/scenario.rs
// ============================================================================
// Module: Conforma Scenarios
// Description: Operations, scenario inputs, outcomes, and message vocabulary.
// Purpose: Describe one parameterized exercise of a CRUD form.
// Dependencies: serde, crate::core::{fields, identifiers}
// ============================================================================

//! ## Overview
//! A scenario is an immutable description of one exercise of the system
//! under test: the operation, the submitted fields, and the expected outcome
//! with its message. The [`Vocabulary`] centralizes every user-facing message
//! template so the catalog, the reference registry, and assertions agree on
//! exact strings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::fields::FieldMap;
use crate::core::identifiers::ResourceName;
use crate::core::resource::DependentKind;

// ============================================================================
// SECTION: Operations and Outcomes
// ============================================================================

/// CRUD form operation under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create a new resource.
    Create,
    /// Update an existing resource.
    Update,
    /// Clone an existing resource into a new one.
    Clone,
    /// Delete an existing resource.
    Delete,
    /// Abandon a pending form without submitting.
    Cancel,
}

impl Operation {
    /// All operations in catalog order.
    pub const ALL: [Self; 5] =
        [Self::Create, Self::Update, Self::Clone, Self::Delete, Self::Cancel];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Clone => "clone",
            Self::Delete => "delete",
            Self::Cancel => "cancel",
        };
        f.write_str(label)
    }
}

/// Outcome of a form submission, expected or observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The submission was accepted and persisted.
    Success,
    /// The submission was rejected with no write.
    Failure,
}

// ============================================================================
// SECTION: Scenario
// ============================================================================

/// Immutable input describing one exercise of the system under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Short label used in reports.
    pub label: String,
    /// Operation to perform.
    pub operation: Operation,
    /// Existing resource the form is opened on; `None` opens a blank create
    /// form.
    pub target: Option<ResourceName>,
    /// Field values to fill before submitting.
    pub fields: FieldMap,
    /// Expected outcome.
    pub expected: Outcome,
    /// Expected flash title; `None` means the canonical title for the
    /// operation and outcome.
    pub expected_title: Option<String>,
    /// Expected error detail; required when the expected outcome is
    /// [`Outcome::Failure`].
    pub expected_error: Option<String>,
    /// Whether stored values are compared against trimmed inputs.
    pub trim: bool,
}

impl Scenario {
    /// Creates a success scenario with the given fields.
    #[must_use]
    pub fn success(label: impl Into<String>, operation: Operation, fields: FieldMap) -> Self {
        Self {
            label: label.into(),
            operation,
            target: None,
            fields,
            expected: Outcome::Success,
            expected_title: None,
            expected_error: None,
            trim: false,
        }
    }

    /// Creates a failure scenario with the given fields and error detail.
    #[must_use]
    pub fn failure(
        label: impl Into<String>,
        operation: Operation,
        fields: FieldMap,
        error: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            operation,
            target: None,
            fields,
            expected: Outcome::Failure,
            expected_title: None,
            expected_error: Some(error.into()),
            trim: false,
        }
    }

    /// Sets the existing resource the form is opened on.
    #[must_use]
    pub fn with_target(mut self, target: ResourceName) -> Self {
        self.target = Some(target);
        self
    }

    /// Overrides the expected flash title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.expected_title = Some(title.into());
        self
    }

    /// Enables trimmed-value comparison for stored fields.
    #[must_use]
    pub const fn with_trim(mut self) -> Self {
        self.trim = true;
        self
    }
}

// ============================================================================
// SECTION: Submit Outcome
// ============================================================================

/// Result of one form submission as observed by the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// Observed outcome.
    pub outcome: Outcome,
    /// Flash title shown to the user, when any.
    pub title: Option<String>,
    /// Error details shown to the user.
    pub details: Vec<String>,
}

impl SubmitOutcome {
    /// Creates a success outcome with a flash title.
    #[must_use]
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            title: Some(title.into()),
            details: Vec::new(),
        }
    }

    /// Creates a failure outcome with a flash title and one error detail.
    #[must_use]
    pub fn failure(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failure,
            title: Some(title.into()),
            details: vec![detail.into()],
        }
    }

    /// Creates a silent success outcome (cancelled form, no flash message).
    #[must_use]
    pub const fn silent() -> Self {
        Self {
            outcome: Outcome::Success,
            title: None,
            details: Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Vocabulary
// ============================================================================

/// Message vocabulary for one resource type.
///
/// Every user-facing string the catalog expects and the reference registry
/// produces is built here, so the two can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Full resource label, e.g. `Host group`.
    pub full_label: String,
    /// Short resource label, e.g. `Group`.
    pub short_label: String,
    /// Lowercase noun used in flash titles, e.g. `group`.
    pub noun: String,
    /// Name field label, e.g. `Group name`.
    pub field_label: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::host_groups()
    }
}

impl Vocabulary {
    /// Vocabulary for the illustrative host group resource.
    #[must_use]
    pub fn host_groups() -> Self {
        Self {
            full_label: "Host group".to_string(),
            short_label: "Group".to_string(),
            noun: "group".to_string(),
            field_label: "Group name".to_string(),
        }
    }

    /// Canonical flash title for a successful operation, when one exists.
    #[must_use]
    pub fn success_title(&self, operation: Operation) -> Option<String> {
        let verb = match operation {
            Operation::Create | Operation::Clone => "added",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
            Operation::Cancel => return None,
        };
        Some(format!("{} {verb}", self.short_label))
    }

    /// Canonical flash title for a failed operation, when one exists.
    #[must_use]
    pub fn failure_title(&self, operation: Operation) -> Option<String> {
        let verb = match operation {
            Operation::Create | Operation::Clone => "add",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Cancel => return None,
        };
        Some(format!("Cannot {verb} {}", self.noun))
    }

    /// Flash title used when field validation rejects the raw input.
    #[must_use]
    pub fn incorrect_data_title(&self) -> String {
        "Page received incorrect data".to_string()
    }

    /// Duplicate-name validation message.
    #[must_use]
    pub fn already_exists(&self, name: &str) -> String {
        format!("{} \"{name}\" already exists.", self.full_label)
    }

    /// Empty-name validation message.
    #[must_use]
    pub fn cannot_be_empty(&self) -> String {
        format!("Incorrect value for field \"{}\": cannot be empty.", self.field_label)
    }

    /// Invalid-name validation message.
    #[must_use]
    pub fn invalid_name(&self) -> String {
        format!("Invalid parameter \"/1/name\": invalid {} name.", self.full_label.to_lowercase())
    }

    /// Refusal message for deleting an internal resource.
    #[must_use]
    pub fn internal_resource(&self, name: &str) -> String {
        format!("{} \"{name}\" is internal and cannot be deleted.", self.full_label)
    }

    /// Refusal message for the first blocking dependent of a delete.
    #[must_use]
    pub fn deletion_blocked(
        &self,
        kind: DependentKind,
        resource: &ResourceName,
        dependent: &str,
    ) -> String {
        let noun = self.noun.as_str();
        let full = self.full_label.as_str();
        let lower_full = self.full_label.to_lowercase();
        let short = self.short_label.as_str();
        match kind {
            DependentKind::Host => {
                format!("Host \"{dependent}\" cannot be without {lower_full}.")
            }
            DependentKind::Script => format!(
                "{full} \"{resource}\" cannot be deleted, because it is used in a global script."
            ),
            DependentKind::Action => format!(
                "{short} \"{resource}\" cannot be deleted, because it is used in a discovery \
                 action."
            ),
            DependentKind::Maintenance => format!(
                "Cannot delete {lower_full} \"{resource}\" because maintenance \"{dependent}\" \
                 must contain at least one host or host {noun}."
            ),
            DependentKind::HostPrototype => format!(
                "{short} \"{resource}\" cannot be deleted, because it is used by a host prototype."
            ),
            DependentKind::Correlation => format!(
                "{short} \"{resource}\" cannot be deleted, because it is used in a correlation \
                 condition."
            ),
        }
    }
}
