// crates/conforma-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for report rendering and config loading.
// Purpose: Ensure CLI output is stable and config parsing fails closed.
// Dependencies: conforma-cli main helpers
// ============================================================================

//! ## Overview
//! Validates the text renderers and the fail-closed configuration loader.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write as _;

use conforma_core::AssertionMismatch;
use conforma_core::ConformanceReport;
use conforma_core::Operation;
use conforma_core::Outcome;
use conforma_core::ScenarioReport;

use crate::config::Backend;
use crate::config::ConformaConfig;
use crate::config::ReportFormat;
use crate::render_text_report;
use crate::render_text_scenarios;

// ============================================================================
// SECTION: Rendering Tests
// ============================================================================

#[test]
fn text_report_marks_divergent_scenarios() {
    let report = ConformanceReport {
        scenarios: vec![
            ScenarioReport {
                label: "duplicate peer name".to_string(),
                operation: Operation::Create,
                mismatches: Vec::new(),
            },
            ScenarioReport {
                label: "missing name".to_string(),
                operation: Operation::Create,
                mismatches: vec![AssertionMismatch::Outcome {
                    expected: Outcome::Failure,
                    observed: Outcome::Success,
                }],
            },
        ],
    };
    let rendered = render_text_report(&report);
    assert!(rendered.contains("PASS"));
    assert!(rendered.contains("FAIL"));
    assert!(rendered.contains("2 scenarios, 1 divergences: divergent"));
}

#[test]
fn text_report_reports_conformant_runs() {
    let report = ConformanceReport {
        scenarios: vec![ScenarioReport {
            label: "unreferenced resource".to_string(),
            operation: Operation::Delete,
            mismatches: Vec::new(),
        }],
    };
    let rendered = render_text_report(&report);
    assert!(rendered.ends_with("1 scenarios, 0 divergences: conformant"));
}

#[test]
fn text_scenario_listing_counts_entries() {
    let catalog = conforma_core::ScenarioCatalog::default();
    let scenarios = catalog.scenarios(Operation::Delete);
    let rendered = render_text_scenarios(&scenarios);
    assert!(rendered.ends_with("8 scenarios"));
    assert!(rendered.contains("blocked by sole host"));
}

// ============================================================================
// SECTION: Config Tests
// ============================================================================

#[test]
fn missing_default_config_yields_defaults() {
    let config = ConformaConfig::load(None).unwrap();
    assert_eq!(config.suite.backend, Backend::Memory);
    assert_eq!(config.suite.format, ReportFormat::Text);
}

#[test]
fn explicit_missing_config_fails_closed() {
    let missing = std::path::Path::new("no-such-conforma.toml");
    assert!(ConformaConfig::load(Some(missing)).is_err());
}

#[test]
fn unknown_config_fields_are_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("conforma.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[suite]\nbackend = \"memory\"\nunexpected = true").unwrap();
    assert!(ConformaConfig::load(Some(&path)).is_err());
}

#[test]
fn sqlite_backend_config_parses() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("conforma.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[suite]\nbackend = \"sqlite\"\nformat = \"json\"\n\n[store]\npath = \"state/run.sqlite\""
    )
    .unwrap();
    let config = ConformaConfig::load(Some(&path)).unwrap();
    assert_eq!(config.suite.backend, Backend::Sqlite);
    assert_eq!(config.suite.format, ReportFormat::Json);
    assert_eq!(config.store.path, std::path::PathBuf::from("state/run.sqlite"));
}

#[test]
fn zero_busy_timeout_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("conforma.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[store]\nbusy_timeout_ms = 0").unwrap();
    assert!(ConformaConfig::load(Some(&path)).is_err());
}
