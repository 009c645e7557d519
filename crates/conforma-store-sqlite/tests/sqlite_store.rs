// crates/conforma-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Repository contract coverage for the SQLite backend.
// ============================================================================
//! ## Overview
//! Runs the repository contract against the `SQLite` backend: trimmed unique
//! names, transactional refusals, rule inheritance, and full-suite
//! conformance with imported fixtures.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::use_debug,
    reason = "Tests use unwrap, panic, and debug output on deterministic fixtures."
)]

use std::path::PathBuf;

use conforma_core::ConformanceRunner;
use conforma_core::FieldMap;
use conforma_core::PermissionLevel;
use conforma_core::RegistryFormDriver;
use conforma_core::ResourceName;
use conforma_core::ScenarioCatalog;
use conforma_core::SharedRepository;
use conforma_core::Vocabulary;
use conforma_core::base_registry;
use conforma_core::interfaces::RepositoryError;
use conforma_core::interfaces::ResourceRepository;
use conforma_core::names;
use conforma_core::subgroup_cases;
use conforma_core::subgroup_registry;
use conforma_store_sqlite::SqliteRegistry;
use conforma_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("conforma.sqlite")
}

fn open_registry(dir: &TempDir) -> SqliteRegistry {
    let config = SqliteStoreConfig::new(store_path(dir));
    SqliteRegistry::open(&config, Vocabulary::host_groups()).unwrap()
}

fn name_fields(value: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert(Vocabulary::host_groups().field_label, value);
    fields
}

#[test]
fn create_trims_and_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut registry = open_registry(&dir);
        let record = registry.create(&name_fields("   trim    ")).unwrap();
        assert_eq!(record.name.as_str(), "trim");
    }
    let registry = open_registry(&dir);
    assert_eq!(registry.count(&ResourceName::new("trim")).unwrap(), 1);
}

#[test]
fn create_rejects_duplicates_with_exact_message() {
    let dir = TempDir::new().unwrap();
    let mut registry = open_registry(&dir);
    registry.create(&name_fields("Zabbix servers")).unwrap();
    let err = registry.create(&name_fields("  Zabbix servers  ")).unwrap_err();
    match err {
        RepositoryError::Validation(message) => {
            assert_eq!(message, "Host group \"Zabbix servers\" already exists.");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn failed_mutations_leave_no_partial_write() {
    let dir = TempDir::new().unwrap();
    let mut registry = open_registry(&dir);
    registry.import(&base_registry(Vocabulary::host_groups()).state()).unwrap();
    let before = registry.snapshot().unwrap();
    registry.create(&name_fields(names::TEMPLATES)).unwrap_err();
    registry.create(&name_fields("Test/Test/")).unwrap_err();
    registry.delete(&ResourceName::new(names::HOST_GROUP)).unwrap_err();
    registry.delete(&ResourceName::new(names::DISCOVERED_HOSTS)).unwrap_err();
    assert_eq!(registry.snapshot().unwrap(), before);
}

#[test]
fn delete_refusal_names_the_blocking_dependent() {
    let dir = TempDir::new().unwrap();
    let mut registry = open_registry(&dir);
    registry.import(&base_registry(Vocabulary::host_groups()).state()).unwrap();
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
fn rename_keeps_access_rules_attached() {
    let dir = TempDir::new().unwrap();
    let mut registry = open_registry(&dir);
    registry.import(&subgroup_registry(Vocabulary::host_groups()).state()).unwrap();
    registry
        .rename(&ResourceName::new("Cities/Cesis"), &name_fields("Cities/Valmiera"))
        .unwrap();
    let rules = registry.access_rules().unwrap();
    let rule = rules.iter().find(|r| r.resource.as_str() == "Cities/Valmiera").unwrap();
    assert_eq!(rule.permission, PermissionLevel::Read);
    assert_eq!(rule.tag_filters.len(), 1);
    assert!(rules.iter().all(|r| r.resource.as_str() != "Cities/Cesis"));
}

#[test]
fn created_child_inherits_nearest_ruled_ancestor() {
    let dir = TempDir::new().unwrap();
    let mut registry = open_registry(&dir);
    registry.import(&subgroup_registry(Vocabulary::host_groups()).state()).unwrap();
    registry.create(&name_fields("Streets/Dzelzavas")).unwrap();
    let rules = registry.access_rules().unwrap();
    let inherited = rules.iter().find(|r| r.resource.as_str() == "Streets/Dzelzavas").unwrap();
    assert_eq!(inherited.permission, PermissionLevel::Deny);
}

#[test]
fn snapshot_matches_the_in_memory_backend() {
    let dir = TempDir::new().unwrap();
    let fixture = base_registry(Vocabulary::host_groups());
    let mut registry = open_registry(&dir);
    registry.import(&fixture.state()).unwrap();
    assert_eq!(registry.snapshot().unwrap(), fixture.snapshot().unwrap());
}

#[test]
fn full_suite_conforms_against_sqlite_backend() {
    let dir = TempDir::new().unwrap();
    let vocab = Vocabulary::host_groups();
    let mut registry = open_registry(&dir);
    registry.import(&base_registry(vocab.clone()).state()).unwrap();
    let shared = SharedRepository::new(registry);
    let driver = RegistryFormDriver::new(shared.clone(), vocab.clone());
    let mut runner = ConformanceRunner::new(driver, shared, ScenarioCatalog::new(vocab));
    let report = runner.run_all().unwrap();
    for scenario in &report.scenarios {
        assert!(
            scenario.passed(),
            "scenario {:?} diverged: {:?}",
            scenario.label,
            scenario.mismatches
        );
    }
}

#[test]
fn propagation_suite_conforms_against_sqlite_backend() {
    let dir = TempDir::new().unwrap();
    let vocab = Vocabulary::host_groups();
    let mut registry = open_registry(&dir);
    registry.import(&subgroup_registry(vocab.clone()).state()).unwrap();
    let shared = SharedRepository::new(registry);
    let driver = RegistryFormDriver::new(shared.clone(), vocab.clone());
    let mut runner = ConformanceRunner::new(driver, shared, ScenarioCatalog::new(vocab));
    let report = runner.run_propagation_suite(&subgroup_cases()).unwrap();
    assert!(report.passed(), "diverged: {:?}", report.scenarios);
}

#[test]
fn open_rejects_directory_paths() {
    let dir = TempDir::new().unwrap();
    let config = SqliteStoreConfig::new(dir.path());
    assert!(SqliteRegistry::open(&config, Vocabulary::host_groups()).is_err());
}
