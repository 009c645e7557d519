// crates/conforma-core/src/interfaces/mod.rs
// ============================================================================
// Module: Conforma Interfaces
// Description: Backend-agnostic boundaries for persistence and form driving.
// Purpose: Define the contract surfaces the conformance runner exercises.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The conformance core depends on two abstract boundaries it does not
//! implement: a [`ResourceRepository`] persisting resource rows with their
//! dependents and access rules, and a [`FormDriver`] simulating filling and
//! submitting a structured form. Implementations must be deterministic:
//! validation and referential checks run before any mutation, so a rejected
//! submission leaves no partial write behind.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::AccessRule;
use crate::core::ConformanceSnapshot;
use crate::core::DependentRecord;
use crate::core::FieldMap;
use crate::core::HashError;
use crate::core::Operation;
use crate::core::ResourceName;
use crate::core::ResourceRecord;
use crate::core::SubmitOutcome;

// ============================================================================
// SECTION: Repository Errors
// ============================================================================

/// Errors surfaced by a resource repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A field value violates a static rule; the message is surfaced verbatim
    /// and no partial write occurred.
    #[error("{0}")]
    Validation(String),
    /// Deletion blocked because a dependent record requires the resource; the
    /// message names the first blocking dependent.
    #[error("{0}")]
    ReferentialIntegrity(String),
    /// The named resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(ResourceName),
    /// The backing store reported an error.
    #[error("repository store error: {0}")]
    Store(String),
}

impl From<HashError> for RepositoryError {
    fn from(err: HashError) -> Self {
        Self::Store(err.to_string())
    }
}

// ============================================================================
// SECTION: Resource Repository
// ============================================================================

/// Persistence boundary for a named resource type.
///
/// Names passed in are normalized (trimmed) by the implementation before any
/// lookup or comparison; uniqueness is enforced over normalized names.
pub trait ResourceRepository {
    /// Creates a resource from submitted fields.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Validation`] when the name is empty,
    /// invalid, or collides with an existing resource.
    fn create(&mut self, fields: &FieldMap) -> Result<ResourceRecord, RepositoryError>;

    /// Reads a resource by normalized name.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Store`] when the backing store fails.
    fn read(&self, name: &ResourceName) -> Result<Option<ResourceRecord>, RepositoryError>;

    /// Renames an existing resource using submitted fields.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for a missing resource and
    /// [`RepositoryError::Validation`] when the new name is rejected.
    fn rename(
        &mut self,
        name: &ResourceName,
        fields: &FieldMap,
    ) -> Result<ResourceRecord, RepositoryError>;

    /// Deletes a resource by normalized name after checking every dependent
    /// join table.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ReferentialIntegrity`] when a dependent
    /// blocks the delete and [`RepositoryError::Validation`] for internal
    /// resources.
    fn delete(&mut self, name: &ResourceName) -> Result<(), RepositoryError>;

    /// Lists all resource rows in surrogate-id order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Store`] when the backing store fails.
    fn list(&self) -> Result<Vec<ResourceRecord>, RepositoryError>;

    /// Counts rows stored under the given normalized name (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Store`] when the backing store fails.
    fn count(&self, name: &ResourceName) -> Result<usize, RepositoryError>;

    /// Returns dependent join rows referencing the named resource.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Store`] when the backing store fails.
    fn dependents_of(
        &self,
        name: &ResourceName,
    ) -> Result<Vec<DependentRecord>, RepositoryError>;

    /// Returns all access rules in canonical (resource name) order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Store`] when the backing store fails.
    fn access_rules(&self) -> Result<Vec<AccessRule>, RepositoryError>;

    /// Captures a content hash of full repository state in canonical row
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Store`] when serialization or the backing
    /// store fails.
    fn snapshot(&self) -> Result<ConformanceSnapshot, RepositoryError>;

    /// Copies the ancestor's permission level and tag filters onto every
    /// existing descendant. Triggered exactly once per explicit call, never
    /// implicitly on create; non-descendants are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] when the ancestor does not
    /// exist.
    fn apply_hierarchy_propagation(
        &mut self,
        ancestor: &ResourceName,
    ) -> Result<(), RepositoryError>;
}

// ============================================================================
// SECTION: Form Driver
// ============================================================================

/// Errors surfaced by a form driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The driver could not open the form for the target resource.
    #[error("form target not found: {0}")]
    TargetNotFound(ResourceName),
    /// The driver failed outside the submit contract; the scenario is
    /// reported as a hard failure and the suite continues.
    #[error("form driver error: {0}")]
    Driver(String),
}

/// Simulates filling and submitting a structured form against a repository.
///
/// Implementations must trim whitespace from free-text fields before
/// submission, mirroring the resource's own normalization.
pub trait FormDriver {
    /// Submits the operation with the given fields against the target
    /// resource, returning the observed outcome and message.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] for failures outside the submit contract;
    /// rejected submissions are reported through [`SubmitOutcome`], not as
    /// errors.
    fn submit(
        &mut self,
        operation: Operation,
        target: Option<&ResourceName>,
        fields: &FieldMap,
    ) -> Result<SubmitOutcome, DriverError>;
}
