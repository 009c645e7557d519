// crates/conforma-core/src/core/resource.rs
// ============================================================================
// Module: Conforma Resource Model
// Description: Stored resource rows, dependents, and permission state.
// Purpose: Define the relational shape the repository boundary persists.
// Dependencies: serde, crate::core::identifiers
// ============================================================================

//! ## Overview
//! A resource is a relational row keyed by a surrogate id with a unique
//! normalized name. Dependent join rows link it to entities that may block
//! deletion (hosts, scripts, actions, maintenance windows, host prototypes,
//! correlation rules). Access rules carry the permission level and tag
//! filters subject to hierarchy propagation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ResourceName;

// ============================================================================
// SECTION: Resource Id
// ============================================================================

/// Surrogate identifier assigned by the repository on create.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Creates an identifier from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Resource Record
// ============================================================================

/// Stored resource row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Surrogate identifier.
    pub id: ResourceId,
    /// Normalized unique name.
    pub name: ResourceName,
    /// Internal resources cannot be deleted.
    pub internal: bool,
    /// Discovered resources were created by a discovery rule; their name is
    /// read-only on the form.
    pub discovered: bool,
}

impl ResourceRecord {
    /// Creates a plain (non-internal, non-discovered) record.
    #[must_use]
    pub fn new(id: ResourceId, name: ResourceName) -> Self {
        Self {
            id,
            name,
            internal: false,
            discovered: false,
        }
    }
}

// ============================================================================
// SECTION: Dependents
// ============================================================================

/// Kinds of entities that may hold a reference to a resource.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DependentKind {
    /// A host whose only group membership is this resource.
    Host,
    /// A global script scoped to the resource.
    Script,
    /// A discovery action adding hosts to the resource.
    Action,
    /// A maintenance window covering the resource.
    Maintenance,
    /// A host prototype linked to the resource.
    HostPrototype,
    /// A correlation rule conditioned on the resource.
    Correlation,
}

/// Join row linking a dependent entity to its resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependentRecord {
    /// Owning resource identifier.
    pub resource_id: ResourceId,
    /// Dependent entity kind.
    pub kind: DependentKind,
    /// Dependent entity name, surfaced in refusal messages.
    pub name: String,
}

// ============================================================================
// SECTION: Permissions and Tag Filters
// ============================================================================

/// Permission level granted on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    /// No explicit permission.
    None,
    /// Access denied.
    Deny,
    /// Read-only access.
    Read,
    /// Read and write access.
    ReadWrite,
}

/// Tag filter applied to a resource for event filtering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagFilter {
    /// Tag name.
    pub tag: String,
    /// Tag value; empty matches any value.
    pub value: String,
}

impl TagFilter {
    /// Creates a tag filter.
    #[must_use]
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// Permission and tag-filter state attached to one resource.
///
/// # Invariants
/// - At most one rule exists per resource name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    /// Resource the rule applies to.
    pub resource: ResourceName,
    /// Granted permission level.
    pub permission: PermissionLevel,
    /// Tag filters attached to the resource.
    pub tag_filters: Vec<TagFilter>,
}

impl AccessRule {
    /// Creates a rule with no tag filters.
    #[must_use]
    pub fn new(resource: ResourceName, permission: PermissionLevel) -> Self {
        Self {
            resource,
            permission,
            tag_filters: Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Registry State
// ============================================================================

/// Full serializable repository state in canonical row order.
///
/// # Invariants
/// - `resources` are ordered by surrogate id ascending.
/// - `dependents` are ordered by resource id, then kind order, then name.
/// - `access_rules` are ordered by resource name.
///
/// Snapshot hashing runs over this value, so the ordering invariants are what
/// keep before/after comparisons free of false positives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryState {
    /// Resource rows.
    pub resources: Vec<ResourceRecord>,
    /// Dependent join rows.
    pub dependents: Vec<DependentRecord>,
    /// Permission and tag-filter rules.
    pub access_rules: Vec<AccessRule>,
}
