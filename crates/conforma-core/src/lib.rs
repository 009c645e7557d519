// crates/conforma-core/src/lib.rs
// ============================================================================
// Module: Conforma Core Library
// Description: Public API surface for the Conforma core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Conforma core provides a deterministic conformance suite for resource
//! CRUD surfaces: a declarative scenario catalog, a runner that asserts
//! messages and repository state, and reference fixtures. It is
//! backend-agnostic and integrates through explicit driver and repository
//! interfaces rather than embedding into any particular UI stack.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::*;

pub use interfaces::DriverError;
pub use interfaces::FormDriver;
pub use interfaces::RepositoryError;
pub use interfaces::ResourceRepository;
pub use runtime::AssertionMismatch;
pub use runtime::ConformanceReport;
pub use runtime::ConformanceRunner;
pub use runtime::InMemoryRegistry;
pub use runtime::PropagationCase;
pub use runtime::RegistryFormDriver;
pub use runtime::RunnerError;
pub use runtime::ScenarioCatalog;
pub use runtime::ScenarioReport;
pub use runtime::SharedRepository;
pub use runtime::SuiteContext;
pub use runtime::UniqueNameGenerator;
pub use runtime::base_registry;
pub use runtime::names;
pub use runtime::subgroup_cases;
pub use runtime::subgroup_registry;
