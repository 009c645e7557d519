// crates/conforma-core/src/runtime/catalog.rs
// ============================================================================
// Module: Conforma Scenario Catalog
// Description: Ordered scenario sets per operation, derived from one base set.
// Purpose: Supply declarative inputs for the conformance runner.
// Dependencies: crate::core, crate::runtime::fixture, time
// ============================================================================

//! ## Overview
//! The catalog is a pure function of static fixture data: `scenarios(op)`
//! returns the ordered scenario list for an operation. Update scenarios are
//! the create scenarios with a rename applied to the success cases so they
//! cannot collide with the original resource; clone success cases use
//! generated names seeded from a monotonic timestamp so repeated runs stay
//! unique. Failure cases pass through unchanged and reuse peer resources.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use time::OffsetDateTime;

use crate::core::FieldMap;
use crate::core::Operation;
use crate::core::ResourceName;
use crate::core::Scenario;
use crate::core::Vocabulary;
use crate::runtime::fixture::names;

// ============================================================================
// SECTION: Unique Name Generator
// ============================================================================

/// Generates names unique across repeated runs: a wall-clock seed plus a
/// process-local monotonic counter.
#[derive(Debug)]
pub struct UniqueNameGenerator {
    /// Wall-clock seed captured at construction.
    seed: u64,
    /// Monotonic counter within the process.
    counter: AtomicU64,
}

impl Default for UniqueNameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UniqueNameGenerator {
    /// Creates a generator seeded from the current wall clock.
    #[must_use]
    pub fn new() -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            seed: u64::try_from(now).unwrap_or(0),
            counter: AtomicU64::new(0),
        }
    }

    /// Returns a unique name carrying the given suffix.
    #[must_use]
    pub fn unique(&self, suffix: &str) -> String {
        let tick = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}.{tick} {suffix}", self.seed)
    }
}

// ============================================================================
// SECTION: Scenario Catalog
// ============================================================================

/// Enumerates input scenarios per operation.
#[derive(Debug)]
pub struct ScenarioCatalog {
    /// Message vocabulary the expectations are phrased in.
    vocab: Vocabulary,
    /// Generator for run-unique clone and cancel names.
    namer: UniqueNameGenerator,
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self::new(Vocabulary::host_groups())
    }
}

impl ScenarioCatalog {
    /// Creates a catalog for the given vocabulary.
    #[must_use]
    pub fn new(vocab: Vocabulary) -> Self {
        Self {
            vocab,
            namer: UniqueNameGenerator::new(),
        }
    }

    /// Returns the catalog vocabulary.
    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Returns the ordered scenario list for an operation.
    #[must_use]
    pub fn scenarios(&self, operation: Operation) -> Vec<Scenario> {
        match operation {
            Operation::Create => self.create_scenarios(),
            Operation::Update => self.update_scenarios(),
            Operation::Clone => self.clone_scenarios(),
            Operation::Delete => self.delete_scenarios(),
            Operation::Cancel => self.cancel_scenarios(),
        }
    }

    /// Builds a one-field submission for the name field.
    fn name_fields(&self, value: &str) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert(self.vocab.field_label.clone(), value);
        fields
    }

    /// Base create catalog; every other catalog derives from it.
    fn create_scenarios(&self) -> Vec<Scenario> {
        let vocab = &self.vocab;
        vec![
            Scenario::failure(
                "duplicate peer name",
                Operation::Create,
                self.name_fields(names::ZABBIX_SERVERS),
                vocab.already_exists(names::ZABBIX_SERVERS),
            ),
            Scenario::failure(
                "duplicate second peer name",
                Operation::Create,
                self.name_fields(names::TEMPLATES),
                vocab.already_exists(names::TEMPLATES),
            ),
            Scenario::failure(
                "duplicate discovered name",
                Operation::Create,
                self.name_fields(names::DISCOVERED_GROUP),
                vocab.already_exists(names::DISCOVERED_GROUP),
            ),
            Scenario::failure(
                "missing name",
                Operation::Create,
                FieldMap::new(),
                vocab.cannot_be_empty(),
            )
            .with_title(vocab.incorrect_data_title()),
            Scenario::failure(
                "whitespace-only name",
                Operation::Create,
                self.name_fields(" "),
                vocab.cannot_be_empty(),
            )
            .with_title(vocab.incorrect_data_title()),
            Scenario::failure(
                "trailing separator",
                Operation::Create,
                self.name_fields("Test/Test/"),
                vocab.invalid_name(),
            ),
            Scenario::failure(
                "escaped separator",
                Operation::Create,
                self.name_fields("Test/Test\\/"),
                vocab.invalid_name(),
            ),
            Scenario::success(
                "symbols and unicode",
                Operation::Create,
                self.name_fields("~!@#$%^&*()_+=[]{}null☺æų"),
            ),
            Scenario::success("surrounding whitespace", Operation::Create, self.name_fields("   trim    "))
                .with_trim(),
            Scenario::success(
                "nested subgroups",
                Operation::Create,
                self.name_fields("Group/Subgroup1/Subgroup2"),
            ),
        ]
    }

    /// Update catalog: create scenarios with success cases renamed so they
    /// cannot collide with the resource being updated.
    fn update_scenarios(&self) -> Vec<Scenario> {
        self.create_scenarios()
            .into_iter()
            .map(|mut scenario| {
                scenario.operation = Operation::Update;
                if scenario.expected == crate::core::Outcome::Success {
                    let renamed = if scenario.trim {
                        "   trim update    ".to_string()
                    } else {
                        let current =
                            scenario.fields.get_or(&self.vocab.field_label, "").to_string();
                        format!("{current}update")
                    };
                    scenario.fields = self.name_fields(&renamed);
                }
                scenario
            })
            .collect()
    }

    /// Clone catalog: a collision with the source name plus unique clones.
    fn clone_scenarios(&self) -> Vec<Scenario> {
        let vocab = &self.vocab;
        vec![
            Scenario::failure(
                "clone into existing name",
                Operation::Clone,
                FieldMap::new(),
                vocab.already_exists(names::DELETE_GROUP),
            )
            .with_target(ResourceName::new(names::DELETE_GROUP)),
            Scenario::success(
                "clone into unique name",
                Operation::Clone,
                self.name_fields(&self.namer.unique("cloned group")),
            )
            .with_target(ResourceName::new(names::DELETE_GROUP)),
            Scenario::success(
                "clone discovered into plain copy",
                Operation::Clone,
                self.name_fields(&format!("{} cloned group", names::DISCOVERED_GROUP)),
            )
            .with_target(ResourceName::new(names::DISCOVERED_GROUP)),
        ]
    }

    /// Delete catalog: one refusal per dependent kind, the internal refusal,
    /// then the success case.
    fn delete_scenarios(&self) -> Vec<Scenario> {
        let vocab = &self.vocab;
        let refusal = |label: &str, target: &str, error: String| {
            Scenario::failure(label, Operation::Delete, FieldMap::new(), error)
                .with_target(ResourceName::new(target))
        };
        vec![
            refusal(
                "blocked by sole host",
                names::HOST_GROUP,
                vocab.deletion_blocked(
                    crate::core::DependentKind::Host,
                    &ResourceName::new(names::HOST_GROUP),
                    names::BLOCKING_HOST,
                ),
            ),
            refusal(
                "blocked by maintenance",
                names::MAINTENANCE_GROUP,
                vocab.deletion_blocked(
                    crate::core::DependentKind::Maintenance,
                    &ResourceName::new(names::MAINTENANCE_GROUP),
                    names::BLOCKING_MAINTENANCE,
                ),
            ),
            refusal(
                "blocked by correlation",
                names::CORRELATION_GROUP,
                vocab.deletion_blocked(
                    crate::core::DependentKind::Correlation,
                    &ResourceName::new(names::CORRELATION_GROUP),
                    names::BLOCKING_CORRELATION,
                ),
            ),
            refusal(
                "blocked by discovery action",
                names::ACTION_GROUP,
                vocab.deletion_blocked(
                    crate::core::DependentKind::Action,
                    &ResourceName::new(names::ACTION_GROUP),
                    names::BLOCKING_ACTION,
                ),
            ),
            refusal(
                "blocked by script",
                names::SCRIPT_GROUP,
                vocab.deletion_blocked(
                    crate::core::DependentKind::Script,
                    &ResourceName::new(names::SCRIPT_GROUP),
                    names::BLOCKING_SCRIPT,
                ),
            ),
            refusal(
                "blocked by host prototype",
                names::PROTOTYPE_GROUP,
                vocab.deletion_blocked(
                    crate::core::DependentKind::HostPrototype,
                    &ResourceName::new(names::PROTOTYPE_GROUP),
                    names::BLOCKING_PROTOTYPE,
                ),
            ),
            refusal(
                "internal resource",
                names::DISCOVERED_HOSTS,
                vocab.internal_resource(names::DISCOVERED_HOSTS),
            ),
            Scenario::success("unreferenced resource", Operation::Delete, FieldMap::new())
                .with_target(ResourceName::new(names::DELETE_GROUP)),
        ]
    }

    /// Cancel catalog: abandoning each pending form leaves no write behind.
    fn cancel_scenarios(&self) -> Vec<Scenario> {
        ["add", "update", "clone", "delete"]
            .into_iter()
            .map(|action| {
                let mut scenario = Scenario::success(
                    format!("cancelled {action}"),
                    Operation::Cancel,
                    self.name_fields(&self.namer.unique(&format!("Cancel {}", names::DELETE_GROUP))),
                );
                if action != "add" {
                    scenario = scenario.with_target(ResourceName::new(names::DELETE_GROUP));
                }
                scenario
            })
            .collect()
    }
}
