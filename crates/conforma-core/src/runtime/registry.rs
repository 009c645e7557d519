// crates/conforma-core/src/runtime/registry.rs
// ============================================================================
// Module: Conforma In-Memory Registry
// Description: Reference repository and form driver for tests and demos.
// Purpose: Provide a deterministic system under test without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides the reference implementation of the two abstract
//! boundaries: [`InMemoryRegistry`] persists resource rows, dependents, and
//! access rules in ordered maps, and [`RegistryFormDriver`] simulates filling
//! and submitting the resource form against any repository. Both enforce the
//! contract the conformance runner asserts: validation before mutation, no
//! partial writes, trimmed names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::AccessRule;
use crate::core::ConformanceSnapshot;
use crate::core::DependentKind;
use crate::core::DependentRecord;
use crate::core::FieldMap;
use crate::core::FormField;
use crate::core::NameViolation;
use crate::core::Operation;
use crate::core::PermissionLevel;
use crate::core::RegistryState;
use crate::core::ResourceId;
use crate::core::ResourceName;
use crate::core::ResourceRecord;
use crate::core::SubmitOutcome;
use crate::core::TagFilter;
use crate::core::Vocabulary;
use crate::interfaces::DriverError;
use crate::interfaces::FormDriver;
use crate::interfaces::RepositoryError;

// ============================================================================
// SECTION: In-Memory Registry
// ============================================================================

/// In-memory resource repository for tests and demos.
#[derive(Debug, Clone)]
pub struct InMemoryRegistry {
    /// Message vocabulary for validation and refusal messages.
    vocab: Vocabulary,
    /// Next surrogate id to allocate.
    next_id: u64,
    /// Resource rows keyed by surrogate id (canonical order).
    resources: BTreeMap<ResourceId, ResourceRecord>,
    /// Dependent join rows.
    dependents: Vec<DependentRecord>,
    /// Access rules keyed by normalized resource name.
    access_rules: BTreeMap<ResourceName, AccessRule>,
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new(Vocabulary::host_groups())
    }
}

impl InMemoryRegistry {
    /// Creates an empty registry with the given vocabulary.
    #[must_use]
    pub fn new(vocab: Vocabulary) -> Self {
        Self {
            vocab,
            next_id: 1,
            resources: BTreeMap::new(),
            dependents: Vec::new(),
            access_rules: BTreeMap::new(),
        }
    }

    /// Returns the registry vocabulary.
    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Seeds a plain resource row, bypassing form validation. Fixture use
    /// only.
    pub fn seed(&mut self, name: impl Into<ResourceName>) -> ResourceId {
        self.seed_record(name, false, false)
    }

    /// Seeds an internal resource row. Fixture use only.
    pub fn seed_internal(&mut self, name: impl Into<ResourceName>) -> ResourceId {
        self.seed_record(name, true, false)
    }

    /// Seeds a discovered resource row. Fixture use only.
    pub fn seed_discovered(&mut self, name: impl Into<ResourceName>) -> ResourceId {
        self.seed_record(name, false, true)
    }

    /// Seeds a row with explicit flags.
    fn seed_record(
        &mut self,
        name: impl Into<ResourceName>,
        internal: bool,
        discovered: bool,
    ) -> ResourceId {
        let id = ResourceId::new(self.next_id);
        self.next_id += 1;
        let record = ResourceRecord {
            id,
            name: name.into().normalized(),
            internal,
            discovered,
        };
        self.resources.insert(id, record);
        id
    }

    /// Attaches a dependent entity to a seeded resource.
    pub fn seed_dependent(
        &mut self,
        resource_id: ResourceId,
        kind: DependentKind,
        name: impl Into<String>,
    ) {
        self.dependents.push(DependentRecord {
            resource_id,
            kind,
            name: name.into(),
        });
    }

    /// Grants a permission level with tag filters on a resource name.
    pub fn grant(
        &mut self,
        resource: impl Into<ResourceName>,
        permission: PermissionLevel,
        tag_filters: Vec<TagFilter>,
    ) {
        let resource = resource.into().normalized();
        self.access_rules.insert(
            resource.clone(),
            AccessRule {
                resource,
                permission,
                tag_filters,
            },
        );
    }

    /// Returns full state in canonical row order.
    #[must_use]
    pub fn state(&self) -> RegistryState {
        let mut dependents = self.dependents.clone();
        dependents.sort();
        RegistryState {
            resources: self.resources.values().cloned().collect(),
            dependents,
            access_rules: self.access_rules.values().cloned().collect(),
        }
    }

    /// Finds a row by normalized name.
    fn find(&self, name: &ResourceName) -> Option<&ResourceRecord> {
        let normalized = name.normalized();
        self.resources.values().find(|record| record.name == normalized)
    }

    /// Extracts and validates the name field from a submission.
    fn validated_name(&self, fields: &FieldMap) -> Result<ResourceName, RepositoryError> {
        let raw = fields.get_or(&self.vocab.field_label, "");
        let name = ResourceName::new(raw).normalized();
        match name.validate() {
            Ok(()) => Ok(name),
            Err(NameViolation::Empty) => {
                Err(RepositoryError::Validation(self.vocab.cannot_be_empty()))
            }
            Err(NameViolation::InvalidSegment) => {
                Err(RepositoryError::Validation(self.vocab.invalid_name()))
            }
        }
    }

    /// Returns the nearest existing ancestor that carries an access rule.
    fn nearest_ruled_ancestor(&self, name: &ResourceName) -> Option<AccessRule> {
        let mut cursor = name.parent();
        while let Some(ancestor) = cursor {
            if self.find(&ancestor).is_some()
                && let Some(rule) = self.access_rules.get(&ancestor.normalized())
            {
                return Some(rule.clone());
            }
            cursor = ancestor.parent();
        }
        None
    }
}

impl crate::interfaces::ResourceRepository for InMemoryRegistry {
    fn create(&mut self, fields: &FieldMap) -> Result<ResourceRecord, RepositoryError> {
        let name = self.validated_name(fields)?;
        if self.find(&name).is_some() {
            return Err(RepositoryError::Validation(
                self.vocab.already_exists(name.as_str()),
            ));
        }
        let inherited = self.nearest_ruled_ancestor(&name);
        let id = self.seed(name.clone());
        if let Some(rule) = inherited {
            self.access_rules.insert(
                name.clone(),
                AccessRule {
                    resource: name,
                    permission: rule.permission,
                    tag_filters: rule.tag_filters,
                },
            );
        }
        self.resources
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::Store("created row vanished".to_string()))
    }

    fn read(&self, name: &ResourceName) -> Result<Option<ResourceRecord>, RepositoryError> {
        Ok(self.find(name).cloned())
    }

    fn rename(
        &mut self,
        name: &ResourceName,
        fields: &FieldMap,
    ) -> Result<ResourceRecord, RepositoryError> {
        let id = self
            .find(name)
            .map(|record| record.id)
            .ok_or_else(|| RepositoryError::NotFound(name.clone()))?;
        let new_name = self.validated_name(fields)?;
        let old_name = name.normalized();
        if new_name != old_name && self.find(&new_name).is_some() {
            return Err(RepositoryError::Validation(
                self.vocab.already_exists(new_name.as_str()),
            ));
        }
        if let Some(record) = self.resources.get_mut(&id) {
            record.name = new_name.clone();
        }
        // Access rules key on the name; keep the rule attached across the
        // rename.
        if let Some(mut rule) = self.access_rules.remove(&old_name) {
            rule.resource = new_name.clone();
            self.access_rules.insert(new_name.clone(), rule);
        }
        self.resources
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::Store("renamed row vanished".to_string()))
    }

    fn delete(&mut self, name: &ResourceName) -> Result<(), RepositoryError> {
        let record = self.find(name).cloned().ok_or_else(|| RepositoryError::NotFound(name.clone()))?;
        if record.internal {
            return Err(RepositoryError::Validation(
                self.vocab.internal_resource(record.name.as_str()),
            ));
        }
        let mut blocking: Vec<&DependentRecord> =
            self.dependents.iter().filter(|dep| dep.resource_id == record.id).collect();
        blocking.sort();
        if let Some(first) = blocking.first() {
            return Err(RepositoryError::ReferentialIntegrity(self.vocab.deletion_blocked(
                first.kind,
                &record.name,
                &first.name,
            )));
        }
        self.resources.remove(&record.id);
        self.access_rules.remove(&record.name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<ResourceRecord>, RepositoryError> {
        Ok(self.resources.values().cloned().collect())
    }

    fn count(&self, name: &ResourceName) -> Result<usize, RepositoryError> {
        Ok(usize::from(self.find(name).is_some()))
    }

    fn dependents_of(
        &self,
        name: &ResourceName,
    ) -> Result<Vec<DependentRecord>, RepositoryError> {
        let Some(record) = self.find(name) else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<DependentRecord> = self
            .dependents
            .iter()
            .filter(|dep| dep.resource_id == record.id)
            .cloned()
            .collect();
        rows.sort();
        Ok(rows)
    }

    fn access_rules(&self) -> Result<Vec<AccessRule>, RepositoryError> {
        Ok(self.access_rules.values().cloned().collect())
    }

    fn snapshot(&self) -> Result<ConformanceSnapshot, RepositoryError> {
        Ok(ConformanceSnapshot::capture(&self.state())?)
    }

    fn apply_hierarchy_propagation(
        &mut self,
        ancestor: &ResourceName,
    ) -> Result<(), RepositoryError> {
        let ancestor = ancestor.normalized();
        if self.find(&ancestor).is_none() {
            return Err(RepositoryError::NotFound(ancestor));
        }
        let rule = self.access_rules.get(&ancestor).cloned();
        let descendants: Vec<ResourceName> = self
            .resources
            .values()
            .filter(|record| record.name.is_descendant_of(&ancestor))
            .map(|record| record.name.clone())
            .collect();
        for name in descendants {
            match &rule {
                Some(rule) => {
                    self.access_rules.insert(
                        name.clone(),
                        AccessRule {
                            resource: name,
                            permission: rule.permission,
                            tag_filters: rule.tag_filters.clone(),
                        },
                    );
                }
                None => {
                    self.access_rules.remove(&name);
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Shared Repository Wrapper
// ============================================================================

/// Shared repository handle so the driver and the runner can observe the same
/// state. Scenario execution is strictly sequential; the mutex only guards
/// against accidental cross-thread reuse.
#[derive(Debug)]
pub struct SharedRepository<R> {
    /// Inner repository implementation.
    inner: Arc<Mutex<R>>,
}

// Cloning shares the handle; `R` itself is never cloned, so no `R: Clone`
// bound.
impl<R> Clone for SharedRepository<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> SharedRepository<R> {
    /// Wraps a repository in a shared, clonable handle.
    #[must_use]
    pub fn new(repository: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(repository)),
        }
    }

    /// Locks the inner repository.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Store`] when the mutex is poisoned.
    pub fn lock(&self) -> Result<MutexGuard<'_, R>, RepositoryError> {
        self.inner
            .lock()
            .map_err(|_| RepositoryError::Store("repository mutex poisoned".to_string()))
    }
}

impl<R: crate::interfaces::ResourceRepository> crate::interfaces::ResourceRepository
    for SharedRepository<R>
{
    fn create(&mut self, fields: &FieldMap) -> Result<ResourceRecord, RepositoryError> {
        self.lock()?.create(fields)
    }

    fn read(&self, name: &ResourceName) -> Result<Option<ResourceRecord>, RepositoryError> {
        self.lock()?.read(name)
    }

    fn rename(
        &mut self,
        name: &ResourceName,
        fields: &FieldMap,
    ) -> Result<ResourceRecord, RepositoryError> {
        self.lock()?.rename(name, fields)
    }

    fn delete(&mut self, name: &ResourceName) -> Result<(), RepositoryError> {
        self.lock()?.delete(name)
    }

    fn list(&self) -> Result<Vec<ResourceRecord>, RepositoryError> {
        self.lock()?.list()
    }

    fn count(&self, name: &ResourceName) -> Result<usize, RepositoryError> {
        self.lock()?.count(name)
    }

    fn dependents_of(
        &self,
        name: &ResourceName,
    ) -> Result<Vec<DependentRecord>, RepositoryError> {
        self.lock()?.dependents_of(name)
    }

    fn access_rules(&self) -> Result<Vec<AccessRule>, RepositoryError> {
        self.lock()?.access_rules()
    }

    fn snapshot(&self) -> Result<ConformanceSnapshot, RepositoryError> {
        self.lock()?.snapshot()
    }

    fn apply_hierarchy_propagation(
        &mut self,
        ancestor: &ResourceName,
    ) -> Result<(), RepositoryError> {
        self.lock()?.apply_hierarchy_propagation(ancestor)
    }
}

// ============================================================================
// SECTION: Registry Form Driver
// ============================================================================

/// Form driver routing submissions to a resource repository.
///
/// Free-text fields are trimmed before submission, mirroring the resource's
/// own normalization. The required-name check runs at the form layer: an
/// empty trimmed name is rejected with the incorrect-data flash title before
/// the repository sees the submission.
#[derive(Debug, Clone)]
pub struct RegistryFormDriver<R> {
    /// Repository the form submits against.
    repository: R,
    /// Message vocabulary shared with the repository.
    vocab: Vocabulary,
}

impl<R: crate::interfaces::ResourceRepository> RegistryFormDriver<R> {
    /// Creates a driver over the given repository.
    #[must_use]
    pub fn new(repository: R, vocab: Vocabulary) -> Self {
        Self {
            repository,
            vocab,
        }
    }

    /// Maps a repository rejection to the observed form outcome.
    fn rejection(&self, operation: Operation, message: String) -> SubmitOutcome {
        let title = if message == self.vocab.cannot_be_empty() {
            self.vocab.incorrect_data_title()
        } else {
            self.vocab.failure_title(operation).unwrap_or_else(|| self.vocab.incorrect_data_title())
        };
        SubmitOutcome::failure(title, message)
    }

    /// Resolves the submitted outcome for a mutation result.
    fn resolve<T>(
        &self,
        operation: Operation,
        result: Result<T, RepositoryError>,
    ) -> Result<SubmitOutcome, DriverError> {
        match result {
            Ok(_) => {
                let title = self
                    .vocab
                    .success_title(operation)
                    .ok_or_else(|| DriverError::Driver("operation has no flash title".to_string()))?;
                Ok(SubmitOutcome::success(title))
            }
            Err(
                RepositoryError::Validation(message)
                | RepositoryError::ReferentialIntegrity(message),
            ) => Ok(self.rejection(operation, message)),
            Err(RepositoryError::NotFound(name)) => Err(DriverError::TargetNotFound(name)),
            Err(RepositoryError::Store(message)) => Err(DriverError::Driver(message)),
        }
    }

    /// Describes the form surface for a target resource. The name field is
    /// always required; discovered resources carry a read-only name.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::TargetNotFound`] when the target does not
    /// exist.
    pub fn form_fields(
        &self,
        target: Option<&ResourceName>,
    ) -> Result<Vec<FormField>, DriverError> {
        let (value, discovered) = match target {
            Some(name) => match self.repository.read(name) {
                Ok(Some(record)) => (record.name.as_str().to_string(), record.discovered),
                Ok(None) => return Err(DriverError::TargetNotFound(name.clone())),
                Err(err) => return Err(DriverError::Driver(err.to_string())),
            },
            None => (String::new(), false),
        };
        let mut name_field = FormField::new(self.vocab.field_label.clone(), value).required();
        if discovered {
            name_field = name_field.read_only();
        }
        Ok(vec![name_field])
    }

    /// Returns the target after verifying it exists in the repository.
    fn require_target(
        &self,
        target: Option<&ResourceName>,
    ) -> Result<ResourceRecord, DriverError> {
        let name = target
            .ok_or_else(|| DriverError::Driver("operation requires a form target".to_string()))?;
        match self.repository.read(name) {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(DriverError::TargetNotFound(name.clone())),
            Err(err) => Err(DriverError::Driver(err.to_string())),
        }
    }
}

impl<R: crate::interfaces::ResourceRepository> FormDriver for RegistryFormDriver<R> {
    fn submit(
        &mut self,
        operation: Operation,
        target: Option<&ResourceName>,
        fields: &FieldMap,
    ) -> Result<SubmitOutcome, DriverError> {
        let fields = fields.trimmed();
        match operation {
            Operation::Cancel => Ok(SubmitOutcome::silent()),
            Operation::Create => {
                if fields.get_or(&self.vocab.field_label, "").is_empty() {
                    return Ok(SubmitOutcome::failure(
                        self.vocab.incorrect_data_title(),
                        self.vocab.cannot_be_empty(),
                    ));
                }
                let result = self.repository.create(&fields);
                self.resolve(operation, result)
            }
            Operation::Update => {
                let record = self.require_target(target)?;
                if fields.get_or(&self.vocab.field_label, "").is_empty() {
                    return Ok(SubmitOutcome::failure(
                        self.vocab.incorrect_data_title(),
                        self.vocab.cannot_be_empty(),
                    ));
                }
                let result = self.repository.rename(&record.name, &fields);
                self.resolve(operation, result)
            }
            Operation::Clone => {
                let record = self.require_target(target)?;
                // Cloning opens a create form pre-filled with the source
                // values; an unchanged name collides with the source itself.
                let mut submission = fields.clone();
                if submission.get(&self.vocab.field_label).is_none() {
                    submission.insert(self.vocab.field_label.clone(), record.name.as_str());
                }
                if submission.get_or(&self.vocab.field_label, "").is_empty() {
                    return Ok(SubmitOutcome::failure(
                        self.vocab.incorrect_data_title(),
                        self.vocab.cannot_be_empty(),
                    ));
                }
                let result = self.repository.create(&submission);
                self.resolve(operation, result)
            }
            Operation::Delete => {
                let record = self.require_target(target)?;
                let result = self.repository.delete(&record.name);
                self.resolve(operation, result)
            }
        }
    }
}
