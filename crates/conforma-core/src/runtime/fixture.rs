// crates/conforma-core/src/runtime/fixture.rs
// ============================================================================
// Module: Conforma Fixtures
// Description: Seed data for the conformance suites.
// Purpose: Build deterministic repository fixtures as explicit values.
// Dependencies: crate::core, crate::runtime::registry
// ============================================================================

//! ## Overview
//! Fixture context is passed explicitly into each suite run; there is no
//! ambient mutable state. The base fixture carries the peer resources the
//! create/update catalogs collide with and one resource per dependent kind
//! for the delete catalog. The subgroup fixture carries the hierarchy and
//! access rules the propagation checks exercise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AccessRule;
use crate::core::DependentKind;
use crate::core::PermissionLevel;
use crate::core::ResourceName;
use crate::core::TagFilter;
use crate::core::Vocabulary;
use crate::runtime::registry::InMemoryRegistry;
use crate::runtime::runner::PropagationCase;

// ============================================================================
// SECTION: Fixture Names
// ============================================================================

/// Resource and dependent names shared by fixtures, catalogs, and tests.
pub mod names {
    /// Peer resource every create catalog collides with.
    pub const ZABBIX_SERVERS: &str = "Zabbix servers";
    /// Second peer resource for duplicate checks.
    pub const TEMPLATES: &str = "Templates";
    /// Internal resource that refuses deletion.
    pub const DISCOVERED_HOSTS: &str = "Discovered hosts";
    /// Resource created by a discovery rule.
    pub const DISCOVERED_GROUP: &str = "Group created from host prototype 1";
    /// Resource renamed by the update catalog.
    pub const UPDATE_GROUP: &str = "Group for Update test";
    /// Resource removed by the delete catalog success case.
    pub const DELETE_GROUP: &str = "Group for Delete test";
    /// Resource whose sole host blocks deletion.
    pub const HOST_GROUP: &str = "One group for Delete";
    /// Resource referenced by a global script.
    pub const SCRIPT_GROUP: &str = "Group for Script";
    /// Resource referenced by a discovery action.
    pub const ACTION_GROUP: &str = "Group for Action";
    /// Resource covered by a maintenance window.
    pub const MAINTENANCE_GROUP: &str = "Group for Maintenance";
    /// Resource linked to a host prototype.
    pub const PROTOTYPE_GROUP: &str = "Group for Host prototype";
    /// Resource used in a correlation condition.
    pub const CORRELATION_GROUP: &str = "Group for Correlation";
    /// Host whose only group membership blocks deletion.
    pub const BLOCKING_HOST: &str = "Host for host group testing";
    /// Script dependent name.
    pub const BLOCKING_SCRIPT: &str = "Script for host group testing";
    /// Action dependent name.
    pub const BLOCKING_ACTION: &str = "Discovery action for host group testing";
    /// Maintenance dependent name.
    pub const BLOCKING_MAINTENANCE: &str = "Maintenance for host group testing";
    /// Host prototype dependent name.
    pub const BLOCKING_PROTOTYPE: &str = "Host prototype for host group testing";
    /// Correlation dependent name.
    pub const BLOCKING_CORRELATION: &str = "Correlation for host group testing";
}

// ============================================================================
// SECTION: Base Fixture
// ============================================================================

/// Builds the repository fixture for the create/update/clone/delete/cancel
/// catalogs.
#[must_use]
pub fn base_registry(vocab: Vocabulary) -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new(vocab);
    registry.seed(names::ZABBIX_SERVERS);
    registry.seed(names::TEMPLATES);
    registry.seed_internal(names::DISCOVERED_HOSTS);
    registry.seed_discovered(names::DISCOVERED_GROUP);
    registry.seed(names::UPDATE_GROUP);
    registry.seed(names::DELETE_GROUP);

    let host_group = registry.seed(names::HOST_GROUP);
    registry.seed_dependent(host_group, DependentKind::Host, names::BLOCKING_HOST);

    let script_group = registry.seed(names::SCRIPT_GROUP);
    registry.seed_dependent(script_group, DependentKind::Script, names::BLOCKING_SCRIPT);

    let action_group = registry.seed(names::ACTION_GROUP);
    registry.seed_dependent(action_group, DependentKind::Action, names::BLOCKING_ACTION);

    let maintenance_group = registry.seed(names::MAINTENANCE_GROUP);
    registry.seed_dependent(
        maintenance_group,
        DependentKind::Maintenance,
        names::BLOCKING_MAINTENANCE,
    );

    let prototype_group = registry.seed(names::PROTOTYPE_GROUP);
    registry.seed_dependent(
        prototype_group,
        DependentKind::HostPrototype,
        names::BLOCKING_PROTOTYPE,
    );

    let correlation_group = registry.seed(names::CORRELATION_GROUP);
    registry.seed_dependent(
        correlation_group,
        DependentKind::Correlation,
        names::BLOCKING_CORRELATION,
    );

    registry
}

// ============================================================================
// SECTION: Subgroup Fixture
// ============================================================================

/// Builds the repository fixture for the hierarchy propagation checks:
/// the Europe tree plus unrelated siblings, with the access rules the
/// original user group carries.
#[must_use]
pub fn subgroup_registry(vocab: Vocabulary) -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new(vocab);
    registry.seed("Europe");
    registry.seed("Europe/Latvia");
    registry.seed("Europe/Latvia/Riga/Zabbix");
    registry.seed("Europe/Test");
    registry.seed("Europe/Test/Zabbix");
    registry.seed("Streets");
    registry.seed("Cities/Cesis");

    registry.grant("Europe", PermissionLevel::Deny, vec![TagFilter::new("world", "")]);
    registry.grant("Europe/Latvia", PermissionLevel::Read, Vec::new());
    registry.grant(
        "Europe/Test",
        PermissionLevel::ReadWrite,
        vec![TagFilter::new("country", "test")],
    );
    registry.grant("Streets", PermissionLevel::Deny, vec![TagFilter::new("street", "")]);
    registry.grant(
        "Cities/Cesis",
        PermissionLevel::Read,
        vec![TagFilter::new("city", "Cesis")],
    );

    registry
}

// ============================================================================
// SECTION: Propagation Cases
// ============================================================================

/// Builds one access rule for an expected-projection list.
fn rule(resource: &str, permission: PermissionLevel, tag_filters: Vec<TagFilter>) -> AccessRule {
    AccessRule {
        resource: ResourceName::new(resource),
        permission,
        tag_filters,
    }
}

/// Ordered propagation checks run against [`subgroup_registry`]. The cases
/// share one repository: the second case starts from the state the first
/// leaves behind.
#[must_use]
pub fn subgroup_cases() -> Vec<PropagationCase> {
    vec![
        // Applying a ruled node's permissions touches only its descendants;
        // the freshly created root with no ruled ancestor stays bare.
        PropagationCase {
            label: "apply to ruled subtree".to_string(),
            create: Some(ResourceName::new("Cities")),
            apply_to: ResourceName::new("Europe/Test"),
            expected_rules: vec![
                rule(
                    "Cities/Cesis",
                    PermissionLevel::Read,
                    vec![TagFilter::new("city", "Cesis")],
                ),
                rule("Europe", PermissionLevel::Deny, vec![TagFilter::new("world", "")]),
                rule("Europe/Latvia", PermissionLevel::Read, Vec::new()),
                rule(
                    "Europe/Test",
                    PermissionLevel::ReadWrite,
                    vec![TagFilter::new("country", "test")],
                ),
                rule(
                    "Europe/Test/Zabbix",
                    PermissionLevel::ReadWrite,
                    vec![TagFilter::new("country", "test")],
                ),
                rule("Streets", PermissionLevel::Deny, vec![TagFilter::new("street", "")]),
            ],
        },
        // A new child under a ruled parent inherits that rule at create
        // time; applying the tree root then overwrites every descendant.
        PropagationCase {
            label: "apply to tree root".to_string(),
            create: Some(ResourceName::new("Streets/Dzelzavas")),
            apply_to: ResourceName::new("Europe"),
            expected_rules: vec![
                rule(
                    "Cities/Cesis",
                    PermissionLevel::Read,
                    vec![TagFilter::new("city", "Cesis")],
                ),
                rule("Europe", PermissionLevel::Deny, vec![TagFilter::new("world", "")]),
                rule("Europe/Latvia", PermissionLevel::Deny, vec![TagFilter::new("world", "")]),
                rule(
                    "Europe/Latvia/Riga/Zabbix",
                    PermissionLevel::Deny,
                    vec![TagFilter::new("world", "")],
                ),
                rule("Europe/Test", PermissionLevel::Deny, vec![TagFilter::new("world", "")]),
                rule(
                    "Europe/Test/Zabbix",
                    PermissionLevel::Deny,
                    vec![TagFilter::new("world", "")],
                ),
                rule("Streets", PermissionLevel::Deny, vec![TagFilter::new("street", "")]),
                rule(
                    "Streets/Dzelzavas",
                    PermissionLevel::Deny,
                    vec![TagFilter::new("street", "")],
                ),
            ],
        },
    ]
}
