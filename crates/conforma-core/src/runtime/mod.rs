// crates/conforma-core/src/runtime/mod.rs
// ============================================================================
// Module: Conforma Runtime
// Description: Catalog, fixtures, reference registry, and the runner.
// Purpose: Re-export runtime submodules under one namespace.
// Dependencies: crate::runtime::{catalog, fixture, registry, runner}
// ============================================================================

//! ## Overview
//! The runtime holds everything with behavior: the scenario catalog, the
//! deterministic fixtures, the reference in-memory repository with its form
//! driver, and the conformance runner that ties them together.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod catalog;
pub mod fixture;
pub mod registry;
pub mod runner;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::ScenarioCatalog;
pub use catalog::UniqueNameGenerator;
pub use fixture::base_registry;
pub use fixture::names;
pub use fixture::subgroup_cases;
pub use fixture::subgroup_registry;
pub use registry::InMemoryRegistry;
pub use registry::RegistryFormDriver;
pub use registry::SharedRepository;
pub use runner::AssertionMismatch;
pub use runner::ConformanceReport;
pub use runner::ConformanceRunner;
pub use runner::PropagationCase;
pub use runner::RunnerError;
pub use runner::ScenarioReport;
pub use runner::SuiteContext;
