// crates/conforma-core/tests/catalog.rs
// ============================================================================
// Module: Catalog Tests
// Description: Scenario catalog shape and exact expected messages.
// ============================================================================
//! ## Overview
//! Validates the per-operation scenario sets: counts, expected outcomes,
//! exact message strings, and the derivation rules that keep update names
//! from colliding with create names.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use conforma_core::Operation;
use conforma_core::Outcome;
use conforma_core::ScenarioCatalog;
use conforma_core::Vocabulary;
use conforma_core::names;

#[test]
fn create_catalog_covers_failures_then_successes() {
    let catalog = ScenarioCatalog::default();
    let scenarios = catalog.scenarios(Operation::Create);
    assert_eq!(scenarios.len(), 10);
    assert_eq!(scenarios.iter().filter(|s| s.expected == Outcome::Failure).count(), 7);
    assert_eq!(scenarios.iter().filter(|s| s.expected == Outcome::Success).count(), 3);
}

#[test]
fn duplicate_scenario_expects_exact_message() {
    let catalog = ScenarioCatalog::default();
    let scenarios = catalog.scenarios(Operation::Create);
    let duplicate = scenarios.iter().find(|s| s.label == "duplicate peer name").unwrap();
    assert_eq!(
        duplicate.expected_error.as_deref(),
        Some("Host group \"Zabbix servers\" already exists.")
    );
}

#[test]
fn empty_name_scenarios_expect_incorrect_data_title() {
    let catalog = ScenarioCatalog::default();
    for scenario in catalog.scenarios(Operation::Create) {
        if scenario.label == "missing name" || scenario.label == "whitespace-only name" {
            assert_eq!(
                scenario.expected_title.as_deref(),
                Some("Page received incorrect data")
            );
            assert_eq!(
                scenario.expected_error.as_deref(),
                Some("Incorrect value for field \"Group name\": cannot be empty.")
            );
        }
    }
}

#[test]
fn invalid_name_scenarios_expect_parameter_message() {
    let catalog = ScenarioCatalog::default();
    let scenarios = catalog.scenarios(Operation::Create);
    for label in ["trailing separator", "escaped separator"] {
        let scenario = scenarios.iter().find(|s| s.label == label).unwrap();
        assert_eq!(
            scenario.expected_error.as_deref(),
            Some("Invalid parameter \"/1/name\": invalid host group name.")
        );
    }
}

#[test]
fn update_catalog_renames_success_cases() {
    let catalog = ScenarioCatalog::default();
    let vocab = Vocabulary::host_groups();
    let creates = catalog.scenarios(Operation::Create);
    let updates = catalog.scenarios(Operation::Update);
    assert_eq!(creates.len(), updates.len());
    for (create, update) in creates.iter().zip(&updates) {
        assert_eq!(update.operation, Operation::Update);
        assert_eq!(update.label, create.label);
        assert_eq!(update.expected, create.expected);
        if update.expected == Outcome::Success {
            let create_name = create.fields.get_or(&vocab.field_label, "");
            let update_name = update.fields.get_or(&vocab.field_label, "");
            assert_ne!(create_name.trim(), update_name.trim());
            assert!(update_name.trim().ends_with("update"));
        } else {
            assert_eq!(update.fields, create.fields);
        }
    }
}

#[test]
fn clone_catalog_collides_then_clones_uniquely() {
    let catalog = ScenarioCatalog::default();
    let vocab = Vocabulary::host_groups();
    let scenarios = catalog.scenarios(Operation::Clone);
    assert_eq!(scenarios.len(), 3);
    assert_eq!(scenarios[0].expected, Outcome::Failure);
    assert!(scenarios[0].fields.is_empty());
    assert_eq!(
        scenarios[0].target.as_ref().unwrap().as_str(),
        names::DELETE_GROUP
    );
    assert_eq!(scenarios[1].expected, Outcome::Success);
    assert!(scenarios[1].fields.get_or(&vocab.field_label, "").ends_with("cloned group"));
    assert_eq!(
        scenarios[2].fields.get_or(&vocab.field_label, ""),
        format!("{} cloned group", names::DISCOVERED_GROUP)
    );
}

#[test]
fn delete_catalog_ends_with_the_success_case() {
    let catalog = ScenarioCatalog::default();
    let scenarios = catalog.scenarios(Operation::Delete);
    assert_eq!(scenarios.len(), 8);
    let last = scenarios.last().unwrap();
    assert_eq!(last.expected, Outcome::Success);
    assert_eq!(last.target.as_ref().unwrap().as_str(), names::DELETE_GROUP);
    for scenario in &scenarios[..scenarios.len() - 1] {
        assert_eq!(scenario.expected, Outcome::Failure);
        assert!(scenario.expected_error.is_some());
    }
}

#[test]
fn delete_catalog_names_the_blocking_host() {
    let catalog = ScenarioCatalog::default();
    let scenarios = catalog.scenarios(Operation::Delete);
    let blocked = scenarios.iter().find(|s| s.label == "blocked by sole host").unwrap();
    assert_eq!(
        blocked.expected_error.as_deref(),
        Some("Host \"Host for host group testing\" cannot be without host group.")
    );
}

#[test]
fn cancel_catalog_covers_every_pending_form() {
    let catalog = ScenarioCatalog::default();
    let scenarios = catalog.scenarios(Operation::Cancel);
    assert_eq!(scenarios.len(), 4);
    for scenario in &scenarios {
        assert_eq!(scenario.operation, Operation::Cancel);
        assert_eq!(scenario.expected, Outcome::Success);
        assert!(scenario.expected_title.is_none());
    }
    assert!(scenarios[0].target.is_none());
    assert!(scenarios[1..].iter().all(|s| s.target.is_some()));
}

#[test]
fn generated_names_are_unique_within_a_catalog() {
    let catalog = ScenarioCatalog::default();
    let vocab = Vocabulary::host_groups();
    let first = catalog.scenarios(Operation::Cancel);
    let second = catalog.scenarios(Operation::Cancel);
    let name = |s: &conforma_core::Scenario| s.fields.get_or(&vocab.field_label, "").to_string();
    assert_ne!(name(&first[0]), name(&second[0]));
}

#[test]
fn success_titles_follow_the_vocabulary() {
    let vocab = Vocabulary::host_groups();
    assert_eq!(vocab.success_title(Operation::Create).as_deref(), Some("Group added"));
    assert_eq!(vocab.success_title(Operation::Update).as_deref(), Some("Group updated"));
    assert_eq!(vocab.success_title(Operation::Clone).as_deref(), Some("Group added"));
    assert_eq!(vocab.success_title(Operation::Delete).as_deref(), Some("Group deleted"));
    assert_eq!(vocab.success_title(Operation::Cancel), None);
    assert_eq!(vocab.failure_title(Operation::Delete).as_deref(), Some("Cannot delete group"));
}
