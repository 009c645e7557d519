// crates/conforma-store-sqlite/src/lib.rs
// ============================================================================
// Module: Conforma SQLite Store Library
// Description: Public API surface for the SQLite-backed repository.
// Purpose: Expose the durable ResourceRepository implementation.
// Dependencies: crate::store
// ============================================================================

//! ## Overview
//! Durable [`conforma_core::interfaces::ResourceRepository`] backed by
//! `SQLite` with WAL journaling. Mutations are transactional with validation
//! up front, so conformance snapshots taken around rejected submissions stay
//! bit-identical.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteRegistry;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
