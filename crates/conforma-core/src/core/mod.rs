// crates/conforma-core/src/core/mod.rs
// ============================================================================
// Module: Conforma Core Types
// Description: Data model shared by the catalog, runner, and repositories.
// Purpose: Re-export core submodules under one namespace.
// Dependencies: crate::core::{fields, hashing, identifiers, resource, scenario}
// ============================================================================

//! ## Overview
//! Core types are plain data records with serde derives. Behavior lives in
//! the runtime and behind the interface traits.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod fields;
pub mod hashing;
pub mod identifiers;
pub mod resource;
pub mod scenario;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use fields::FieldMap;
pub use fields::FormField;
pub use hashing::ConformanceSnapshot;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::NAME_SEPARATOR;
pub use identifiers::NameViolation;
pub use identifiers::ResourceName;
pub use resource::AccessRule;
pub use resource::DependentKind;
pub use resource::DependentRecord;
pub use resource::PermissionLevel;
pub use resource::RegistryState;
pub use resource::ResourceId;
pub use resource::ResourceRecord;
pub use resource::TagFilter;
pub use scenario::Operation;
pub use scenario::Outcome;
pub use scenario::Scenario;
pub use scenario::SubmitOutcome;
pub use scenario::Vocabulary;
