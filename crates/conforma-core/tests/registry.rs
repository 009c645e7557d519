// crates/conforma-core/tests/registry.rs
// ============================================================================
// Module: Registry Tests
// Description: Reference repository semantics for create, rename, delete.
// ============================================================================
//! ## Overview
//! Validates the in-memory registry against the repository contract:
//! validation before mutation, trimmed unique names, referential refusals
//! naming the first blocking dependent, and access rules surviving renames.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::use_debug,
    reason = "Tests use unwrap, panic, and debug output on deterministic fixtures."
)]

use conforma_core::DependentKind;
use conforma_core::FieldMap;
use conforma_core::InMemoryRegistry;
use conforma_core::PermissionLevel;
use conforma_core::RegistryFormDriver;
use conforma_core::ResourceName;
use conforma_core::SharedRepository;
use conforma_core::TagFilter;
use conforma_core::Vocabulary;
use conforma_core::base_registry;
use conforma_core::interfaces::RepositoryError;
use conforma_core::interfaces::ResourceRepository;
use conforma_core::names;

fn name_fields(vocab: &Vocabulary, value: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(vocab.field_label.clone(), value);
    fields
}

#[test]
fn create_trims_and_persists_the_name() {
    let vocab = Vocabulary::host_groups();
    let mut registry = InMemoryRegistry::new(vocab.clone());
    let record = registry.create(&name_fields(&vocab, "   trim    ")).unwrap();
    assert_eq!(record.name.as_str(), "trim");
    assert_eq!(registry.count(&ResourceName::new("trim")).unwrap(), 1);
    assert_eq!(registry.count(&ResourceName::new("   trim    ")).unwrap(), 1);
}

#[test]
fn create_rejects_duplicate_names_with_exact_message() {
    let vocab = Vocabulary::host_groups();
    let mut registry = base_registry(vocab.clone());
    let err = registry.create(&name_fields(&vocab, names::ZABBIX_SERVERS)).unwrap_err();
    match err {
        RepositoryError::Validation(message) => {
            assert_eq!(message, "Host group \"Zabbix servers\" already exists.");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn create_rejects_invalid_segments() {
    let vocab = Vocabulary::host_groups();
    let mut registry = InMemoryRegistry::new(vocab.clone());
    let err = registry.create(&name_fields(&vocab, "Test/Test/")).unwrap_err();
    match err {
        RepositoryError::Validation(message) => {
            assert_eq!(message, "Invalid parameter \"/1/name\": invalid host group name.");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn failed_create_leaves_no_partial_write() {
    let vocab = Vocabulary::host_groups();
    let mut registry = base_registry(vocab.clone());
    let before = registry.snapshot().unwrap();
    registry.create(&name_fields(&vocab, names::TEMPLATES)).unwrap_err();
    registry.create(&name_fields(&vocab, "a//b")).unwrap_err();
    assert_eq!(registry.snapshot().unwrap(), before);
}

#[test]
fn rename_rekeys_the_access_rule() {
    let vocab = Vocabulary::host_groups();
    let mut registry = InMemoryRegistry::new(vocab.clone());
    registry.seed("Old name");
    registry.grant("Old name", PermissionLevel::Read, vec![TagFilter::new("env", "prod")]);
    registry
        .rename(&ResourceName::new("Old name"), &name_fields(&vocab, "New name"))
        .unwrap();
    let rules = registry.access_rules().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].resource.as_str(), "New name");
    assert_eq!(rules[0].permission, PermissionLevel::Read);
    assert_eq!(rules[0].tag_filters, vec![TagFilter::new("env", "prod")]);
}

#[test]
fn rename_to_own_name_is_a_no_op() {
    let vocab = Vocabulary::host_groups();
    let mut registry = base_registry(vocab.clone());
    let before = registry.snapshot().unwrap();
    registry
        .rename(
            &ResourceName::new(names::UPDATE_GROUP),
            &name_fields(&vocab, names::UPDATE_GROUP),
        )
        .unwrap();
    assert_eq!(registry.snapshot().unwrap(), before);
}

#[test]
fn rename_missing_resource_reports_not_found() {
    let vocab = Vocabulary::host_groups();
    let mut registry = InMemoryRegistry::new(vocab.clone());
    let err = registry
        .rename(&ResourceName::new("No such group"), &name_fields(&vocab, "Renamed"))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound(_)));
}

#[test]
fn delete_refuses_internal_resources() {
    let vocab = Vocabulary::host_groups();
    let mut registry = base_registry(vocab);
    let err = registry.delete(&ResourceName::new(names::DISCOVERED_HOSTS)).unwrap_err();
    match err {
        RepositoryError::Validation(message) => {
            assert_eq!(
                message,
                "Host group \"Discovered hosts\" is internal and cannot be deleted."
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(registry.count(&ResourceName::new(names::DISCOVERED_HOSTS)).unwrap(), 1);
}

#[test]
fn delete_refusal_names_the_sole_host() {
    let vocab = Vocabulary::host_groups();
    let mut registry = base_registry(vocab);
    let err = registry.delete(&ResourceName::new(names::HOST_GROUP)).unwrap_err();
    match err {
        RepositoryError::ReferentialIntegrity(message) => {
            assert_eq!(
                message,
                "Host \"Host for host group testing\" cannot be without host group."
            );
        }
        other => panic!("expected referential error, got {other:?}"),
    }
}

#[test]
fn delete_refusal_picks_the_first_dependent_in_kind_order() {
    let vocab = Vocabulary::host_groups();
    let mut registry = InMemoryRegistry::new(vocab);
    let id = registry.seed("Crowded group");
    registry.seed_dependent(id, DependentKind::Script, "Late script");
    registry.seed_dependent(id, DependentKind::Host, "Early host");
    let err = registry.delete(&ResourceName::new("Crowded group")).unwrap_err();
    match err {
        RepositoryError::ReferentialIntegrity(message) => {
            assert_eq!(message, "Host \"Early host\" cannot be without host group.");
        }
        other => panic!("expected referential error, got {other:?}"),
    }
}

#[test]
fn delete_removes_row_and_access_rule() {
    let vocab = Vocabulary::host_groups();
    let mut registry = InMemoryRegistry::new(vocab);
    registry.seed("Doomed group");
    registry.grant("Doomed group", PermissionLevel::Deny, Vec::new());
    registry.delete(&ResourceName::new("Doomed group")).unwrap();
    assert_eq!(registry.count(&ResourceName::new("Doomed group")).unwrap(), 0);
    assert!(registry.access_rules().unwrap().is_empty());
}

/// Backend marker without a `Clone` implementation.
struct OpaqueBackend {
    /// Counter mutated through one handle and read through another.
    hits: u32,
}

#[test]
fn shared_handles_clone_without_a_clonable_backend() {
    let shared = SharedRepository::new(OpaqueBackend {
        hits: 0,
    });
    let copy = shared.clone();
    shared.lock().unwrap().hits += 1;
    assert_eq!(copy.lock().unwrap().hits, 1);
}

#[test]
fn blank_form_exposes_a_required_name_field() {
    let vocab = Vocabulary::host_groups();
    let driver = RegistryFormDriver::new(base_registry(vocab.clone()), vocab);
    let fields = driver.form_fields(None).unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "Group name");
    assert!(fields[0].required);
    assert!(fields[0].enabled);
    assert!(fields[0].value.is_empty());
}

#[test]
fn discovered_target_carries_a_read_only_name_field() {
    let vocab = Vocabulary::host_groups();
    let driver = RegistryFormDriver::new(base_registry(vocab.clone()), vocab);
    let fields = driver
        .form_fields(Some(&ResourceName::new(names::DISCOVERED_GROUP)))
        .unwrap();
    assert_eq!(fields[0].value, names::DISCOVERED_GROUP);
    assert!(fields[0].required);
    assert!(!fields[0].enabled);
}

#[test]
fn list_returns_rows_in_surrogate_id_order() {
    let vocab = Vocabulary::host_groups();
    let mut registry = InMemoryRegistry::new(vocab);
    registry.seed("Zulu");
    registry.seed("Alpha");
    registry.seed("Mike");
    let names: Vec<String> = registry
        .list()
        .unwrap()
        .into_iter()
        .map(|record| record.name.as_str().to_string())
        .collect();
    assert_eq!(names, vec!["Zulu", "Alpha", "Mike"]);
}

#[test]
fn dependents_of_returns_sorted_join_rows() {
    let vocab = Vocabulary::host_groups();
    let mut registry = InMemoryRegistry::new(vocab);
    let id = registry.seed("Watched group");
    registry.seed_dependent(id, DependentKind::Maintenance, "Window");
    registry.seed_dependent(id, DependentKind::Host, "Host B");
    registry.seed_dependent(id, DependentKind::Host, "Host A");
    let rows = registry.dependents_of(&ResourceName::new("Watched group")).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].kind, DependentKind::Host);
    assert_eq!(rows[0].name, "Host A");
    assert_eq!(rows[1].name, "Host B");
    assert_eq!(rows[2].kind, DependentKind::Maintenance);
}
