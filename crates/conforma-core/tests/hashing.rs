// crates/conforma-core/tests/hashing.rs
// ============================================================================
// Module: Hashing Tests
// Description: Canonical JSON hashing and snapshot equality coverage.
// ============================================================================
//! ## Overview
//! Validates that snapshot digests are deterministic, independent of field
//! declaration order, and sensitive to any state change.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use conforma_core::ConformanceSnapshot;
use conforma_core::DEFAULT_HASH_ALGORITHM;
use conforma_core::Vocabulary;
use conforma_core::base_registry;
use conforma_core::core::hashing::canonical_json_bytes;
use conforma_core::core::hashing::hash_canonical_json;
use conforma_core::interfaces::ResourceRepository;
use serde::Serialize;

/// Same logical value with fields declared in one order.
#[derive(Serialize)]
struct Ascending {
    alpha: u32,
    beta: u32,
}

/// Same logical value with fields declared in the reverse order.
#[derive(Serialize)]
struct Descending {
    beta: u32,
    alpha: u32,
}

#[test]
fn canonical_json_sorts_object_keys() {
    let ascending = canonical_json_bytes(&Ascending {
        alpha: 1,
        beta: 2,
    })
    .unwrap();
    let descending = canonical_json_bytes(&Descending {
        beta: 2,
        alpha: 1,
    })
    .unwrap();
    assert_eq!(ascending, descending);
}

#[test]
fn digests_are_independent_of_field_order() {
    let ascending = hash_canonical_json(
        DEFAULT_HASH_ALGORITHM,
        &Ascending {
            alpha: 7,
            beta: 9,
        },
    )
    .unwrap();
    let descending = hash_canonical_json(
        DEFAULT_HASH_ALGORITHM,
        &Descending {
            beta: 9,
            alpha: 7,
        },
    )
    .unwrap();
    assert_eq!(ascending, descending);
}

#[test]
fn digest_is_lowercase_hex_of_expected_width() {
    let digest = hash_canonical_json(DEFAULT_HASH_ALGORITHM, &Ascending {
        alpha: 0,
        beta: 0,
    })
    .unwrap();
    assert_eq!(digest.value.len(), 64);
    assert!(digest.value.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn snapshot_is_stable_across_captures() {
    let registry = base_registry(Vocabulary::host_groups());
    let first = registry.snapshot().unwrap();
    let second = registry.snapshot().unwrap();
    assert_eq!(first, second);
}

#[test]
fn snapshot_changes_when_a_row_is_added() {
    let mut registry = base_registry(Vocabulary::host_groups());
    let before = registry.snapshot().unwrap();
    registry.seed("Another group");
    let after = registry.snapshot().unwrap();
    assert_ne!(before, after);
}

#[test]
fn snapshot_captures_identical_states_identically() {
    let left = ConformanceSnapshot::capture(&Ascending {
        alpha: 3,
        beta: 4,
    })
    .unwrap();
    let right = ConformanceSnapshot::capture(&Descending {
        beta: 4,
        alpha: 3,
    })
    .unwrap();
    assert_eq!(left, right);
    assert_eq!(left.digest(), right.digest());
}
