// crates/conforma-core/tests/propagation.rs
// ============================================================================
// Module: Propagation Tests
// Description: Hierarchy permission propagation over the subgroup fixture.
// ============================================================================
//! ## Overview
//! Validates rule inheritance at create time, explicit subtree application,
//! and the full propagation suite against the subgroup fixture.

#![allow(
    clippy::unwrap_used,
    clippy::use_debug,
    reason = "Tests use unwrap and debug output on deterministic fixtures."
)]

use conforma_core::ConformanceRunner;
use conforma_core::FieldMap;
use conforma_core::InMemoryRegistry;
use conforma_core::PermissionLevel;
use conforma_core::RegistryFormDriver;
use conforma_core::ResourceName;
use conforma_core::ScenarioCatalog;
use conforma_core::SharedRepository;
use conforma_core::TagFilter;
use conforma_core::Vocabulary;
use conforma_core::interfaces::RepositoryError;
use conforma_core::interfaces::ResourceRepository;
use conforma_core::subgroup_cases;
use conforma_core::subgroup_registry;

fn name_fields(vocab: &Vocabulary, value: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(vocab.field_label.clone(), value);
    fields
}

#[test]
fn propagation_suite_conforms_against_reference_registry() {
    let vocab = Vocabulary::host_groups();
    let shared = SharedRepository::new(subgroup_registry(vocab.clone()));
    let driver = RegistryFormDriver::new(shared.clone(), vocab.clone());
    let mut runner = ConformanceRunner::new(driver, shared, ScenarioCatalog::new(vocab));
    let report = runner.run_propagation_suite(&subgroup_cases()).unwrap();
    for case in &report.scenarios {
        assert!(case.passed(), "case {:?} diverged: {:?}", case.label, case.mismatches);
    }
    assert!(report.passed());
}

#[test]
fn created_child_inherits_nearest_ruled_ancestor() {
    let vocab = Vocabulary::host_groups();
    let mut registry = subgroup_registry(vocab.clone());
    registry.create(&name_fields(&vocab, "Streets/Dzelzavas")).unwrap();
    let rules = registry.access_rules().unwrap();
    let inherited = rules.iter().find(|r| r.resource.as_str() == "Streets/Dzelzavas").unwrap();
    assert_eq!(inherited.permission, PermissionLevel::Deny);
    assert_eq!(inherited.tag_filters, vec![TagFilter::new("street", "")]);
}

#[test]
fn created_child_skips_unruled_intermediate_ancestors() {
    let vocab = Vocabulary::host_groups();
    let mut registry = subgroup_registry(vocab.clone());
    // "Europe/Latvia/Riga" does not exist; "Europe/Latvia" is the nearest
    // existing ruled ancestor.
    registry.create(&name_fields(&vocab, "Europe/Latvia/Riga/Cesis")).unwrap();
    let rules = registry.access_rules().unwrap();
    let inherited =
        rules.iter().find(|r| r.resource.as_str() == "Europe/Latvia/Riga/Cesis").unwrap();
    assert_eq!(inherited.permission, PermissionLevel::Read);
    assert!(inherited.tag_filters.is_empty());
}

#[test]
fn created_root_without_ruled_ancestor_gets_no_rule() {
    let vocab = Vocabulary::host_groups();
    let mut registry = subgroup_registry(vocab.clone());
    registry.create(&name_fields(&vocab, "Cities")).unwrap();
    let rules = registry.access_rules().unwrap();
    assert!(rules.iter().all(|r| r.resource.as_str() != "Cities"));
}

#[test]
fn apply_copies_rule_to_descendants_only() {
    let vocab = Vocabulary::host_groups();
    let mut registry = subgroup_registry(vocab);
    registry.apply_hierarchy_propagation(&ResourceName::new("Europe/Test")).unwrap();
    let rules = registry.access_rules().unwrap();
    let child = rules.iter().find(|r| r.resource.as_str() == "Europe/Test/Zabbix").unwrap();
    assert_eq!(child.permission, PermissionLevel::ReadWrite);
    assert_eq!(child.tag_filters, vec![TagFilter::new("country", "test")]);
    // Unrelated subtrees keep their own rules.
    let streets = rules.iter().find(|r| r.resource.as_str() == "Streets").unwrap();
    assert_eq!(streets.permission, PermissionLevel::Deny);
    let latvia = rules.iter().find(|r| r.resource.as_str() == "Europe/Latvia").unwrap();
    assert_eq!(latvia.permission, PermissionLevel::Read);
}

#[test]
fn apply_from_unruled_ancestor_clears_descendant_rules() {
    let vocab = Vocabulary::host_groups();
    let mut registry = InMemoryRegistry::new(vocab);
    registry.seed("Plain");
    registry.seed("Plain/Child");
    registry.grant("Plain/Child", PermissionLevel::Read, Vec::new());
    registry.apply_hierarchy_propagation(&ResourceName::new("Plain")).unwrap();
    assert!(registry.access_rules().unwrap().is_empty());
}

#[test]
fn apply_on_missing_ancestor_reports_not_found() {
    let vocab = Vocabulary::host_groups();
    let mut registry = subgroup_registry(vocab);
    let err =
        registry.apply_hierarchy_propagation(&ResourceName::new("Atlantis")).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[test]
fn apply_is_idempotent() {
    let vocab = Vocabulary::host_groups();
    let mut registry = subgroup_registry(vocab);
    registry.apply_hierarchy_propagation(&ResourceName::new("Europe")).unwrap();
    let first = registry.snapshot().unwrap();
    registry.apply_hierarchy_propagation(&ResourceName::new("Europe")).unwrap();
    assert_eq!(registry.snapshot().unwrap(), first);
}
