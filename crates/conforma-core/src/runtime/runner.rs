// crates/conforma-core/src/runtime/runner.rs
// ============================================================================
// Module: Conforma Conformance Runner
// Description: Drives scenarios end-to-end and asserts system behavior.
// Purpose: Detect divergences between the system under test and the contract.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! The runner executes each scenario against the form driver and repository,
//! sequentially and without retries. Expected failures are bracketed by
//! repository snapshots: the content hash taken before the submission must be
//! bit-identical afterwards, proving no partial write occurred. Divergences
//! are collected as [`AssertionMismatch`] values in per-scenario reports; a
//! hard driver error is fatal to that scenario only and the suite continues.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::core::AccessRule;
use crate::core::ConformanceSnapshot;
use crate::core::FieldMap;
use crate::core::Operation;
use crate::core::Outcome;
use crate::core::ResourceName;
use crate::core::Scenario;
use crate::core::Vocabulary;
use crate::interfaces::FormDriver;
use crate::interfaces::RepositoryError;
use crate::interfaces::ResourceRepository;
use crate::runtime::catalog::ScenarioCatalog;
use crate::runtime::fixture::names;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Infrastructure errors that abort the suite (distinct from divergences,
/// which are reported and never abort).
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The repository failed outside the submit path (snapshot, read, count).
    #[error("runner repository access failed: {0}")]
    Repository(#[from] RepositoryError),
}

// ============================================================================
// SECTION: Assertion Mismatches
// ============================================================================

/// One divergence between observed and expected behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AssertionMismatch {
    /// The observed outcome differed from the expectation.
    Outcome {
        /// Expected outcome.
        expected: Outcome,
        /// Observed outcome.
        observed: Outcome,
    },
    /// The flash title differed from the expectation.
    Title {
        /// Expected flash title.
        expected: Option<String>,
        /// Observed flash title.
        observed: Option<String>,
    },
    /// The error detail differed from the expectation.
    Message {
        /// Expected error detail.
        expected: String,
        /// Observed error details.
        observed: Vec<String>,
    },
    /// Repository state changed across an operation that must not write.
    Snapshot {
        /// Digest captured before the submission.
        before: ConformanceSnapshot,
        /// Digest captured after the submission.
        after: ConformanceSnapshot,
    },
    /// A successfully stored resource could not be read back.
    MissingRow {
        /// Normalized name that was expected to exist.
        name: String,
    },
    /// A stored field value differed from the expectation.
    StoredValue {
        /// Field name.
        field: String,
        /// Expected value.
        expected: String,
        /// Stored value.
        observed: String,
    },
    /// A row count differed from the expectation.
    RowCount {
        /// Normalized name that was counted.
        name: String,
        /// Expected row count.
        expected: usize,
        /// Observed row count.
        observed: usize,
    },
    /// Access rules after propagation differed from the expected projection.
    AccessRules {
        /// Expected rules in canonical order.
        expected: Vec<AccessRule>,
        /// Observed rules in canonical order.
        observed: Vec<AccessRule>,
    },
    /// The driver failed outside the submit contract.
    Driver {
        /// Driver error message.
        error: String,
    },
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Result of one scenario execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario label.
    pub label: String,
    /// Operation exercised.
    pub operation: Operation,
    /// Divergences found; empty means the scenario conformed.
    pub mismatches: Vec<AssertionMismatch>,
}

impl ScenarioReport {
    /// Returns whether the scenario conformed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Aggregated result of a suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConformanceReport {
    /// Per-scenario reports in execution order.
    pub scenarios: Vec<ScenarioReport>,
}

impl ConformanceReport {
    /// Returns whether every scenario conformed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(ScenarioReport::passed)
    }

    /// Returns the total number of divergences across scenarios.
    #[must_use]
    pub fn divergences(&self) -> usize {
        self.scenarios.iter().map(|report| report.mismatches.len()).sum()
    }
}

// ============================================================================
// SECTION: Suite Context
// ============================================================================

/// Explicit fixture context threaded through a suite run; replaces the
/// ambient mutable statics of the original harness.
#[derive(Debug, Clone)]
pub struct SuiteContext {
    /// Resource the next update scenario opens; successful updates move it
    /// to the renamed resource.
    pub update_target: ResourceName,
}

impl SuiteContext {
    /// Creates a context opening updates on the given resource.
    #[must_use]
    pub const fn new(update_target: ResourceName) -> Self {
        Self {
            update_target,
        }
    }
}

impl Default for SuiteContext {
    fn default() -> Self {
        Self::new(ResourceName::new(names::UPDATE_GROUP))
    }
}

// ============================================================================
// SECTION: Propagation Case
// ============================================================================

/// One hierarchy propagation check: optionally create a resource, apply the
/// ancestor's permissions to its subtree, then compare full access-rule
/// state.
#[derive(Debug, Clone)]
pub struct PropagationCase {
    /// Case label used in reports.
    pub label: String,
    /// Resource to create before applying, when any.
    pub create: Option<ResourceName>,
    /// Ancestor whose rule is applied to all descendants.
    pub apply_to: ResourceName,
    /// Expected access rules afterwards, in canonical order.
    pub expected_rules: Vec<AccessRule>,
}

// ============================================================================
// SECTION: Conformance Runner
// ============================================================================

/// Executes scenarios against a driver and repository pair.
pub struct ConformanceRunner<D, R> {
    /// Form driver for the system under test.
    driver: D,
    /// Repository handle observing the same state as the driver.
    repository: R,
    /// Scenario catalog.
    catalog: ScenarioCatalog,
    /// Message vocabulary for canonical titles.
    vocab: Vocabulary,
}

impl<D, R> ConformanceRunner<D, R>
where
    D: FormDriver,
    R: ResourceRepository,
{
    /// Creates a runner over the given driver, repository, and catalog.
    #[must_use]
    pub fn new(driver: D, repository: R, catalog: ScenarioCatalog) -> Self {
        let vocab = catalog.vocabulary().clone();
        Self {
            driver,
            repository,
            catalog,
            vocab,
        }
    }

    /// Runs the full CRUD suite in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the repository fails outside the submit
    /// path.
    pub fn run_all(&mut self) -> Result<ConformanceReport, RunnerError> {
        let mut ctx = SuiteContext::default();
        let mut report = ConformanceReport::default();
        for operation in [Operation::Create, Operation::Update] {
            report.scenarios.extend(self.run_operation(operation, &mut ctx)?);
        }
        let unchanged = self.check_unchanged_update(&ctx)?;
        report.scenarios.push(unchanged);
        for operation in [Operation::Clone, Operation::Cancel, Operation::Delete] {
            report.scenarios.extend(self.run_operation(operation, &mut ctx)?);
        }
        Ok(report)
    }

    /// Runs every scenario of one operation.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the repository fails outside the submit
    /// path.
    pub fn run_operation(
        &mut self,
        operation: Operation,
        ctx: &mut SuiteContext,
    ) -> Result<Vec<ScenarioReport>, RunnerError> {
        let mut reports = Vec::new();
        for scenario in self.catalog.scenarios(operation) {
            reports.push(self.run_scenario(&scenario, ctx)?);
        }
        Ok(reports)
    }

    /// Runs one scenario end-to-end.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the repository fails outside the submit
    /// path.
    pub fn run_scenario(
        &mut self,
        scenario: &Scenario,
        ctx: &mut SuiteContext,
    ) -> Result<ScenarioReport, RunnerError> {
        let mut mismatches = Vec::new();
        let target = match (&scenario.target, scenario.operation) {
            (Some(target), _) => Some(target.clone()),
            (None, Operation::Update) => Some(ctx.update_target.clone()),
            _ => None,
        };

        // Cancelled forms share the no-write invariant with expected
        // failures.
        let guard = scenario.expected == Outcome::Failure
            || scenario.operation == Operation::Cancel;
        let before = if guard { Some(self.repository.snapshot()?) } else { None };

        match self.driver.submit(scenario.operation, target.as_ref(), &scenario.fields) {
            Ok(observed) => {
                if observed.outcome != scenario.expected {
                    mismatches.push(AssertionMismatch::Outcome {
                        expected: scenario.expected,
                        observed: observed.outcome,
                    });
                }
                let expected_title = scenario.expected_title.clone().or_else(|| match scenario
                    .expected
                {
                    Outcome::Success => self.vocab.success_title(scenario.operation),
                    Outcome::Failure => self.vocab.failure_title(scenario.operation),
                });
                if observed.title != expected_title {
                    mismatches.push(AssertionMismatch::Title {
                        expected: expected_title,
                        observed: observed.title.clone(),
                    });
                }
                match scenario.expected {
                    Outcome::Success => {
                        self.assert_success(scenario, target.as_ref(), ctx, &mut mismatches)?;
                    }
                    Outcome::Failure => {
                        if let Some(expected_error) = &scenario.expected_error
                            && !observed.details.iter().any(|detail| detail == expected_error)
                        {
                            mismatches.push(AssertionMismatch::Message {
                                expected: expected_error.clone(),
                                observed: observed.details.clone(),
                            });
                        }
                    }
                }
            }
            Err(err) => {
                mismatches.push(AssertionMismatch::Driver {
                    error: err.to_string(),
                });
            }
        }

        if let Some(before) = before {
            let after = self.repository.snapshot()?;
            if after != before {
                mismatches.push(AssertionMismatch::Snapshot {
                    before,
                    after,
                });
            }
        }

        if scenario.operation == Operation::Delete
            && scenario.expected == Outcome::Failure
            && let Some(target) = &target
        {
            let count = self.repository.count(target)?;
            if count == 0 {
                mismatches.push(AssertionMismatch::RowCount {
                    name: target.normalized().as_str().to_string(),
                    expected: 1,
                    observed: count,
                });
            }
        }

        Ok(ScenarioReport {
            label: scenario.label.clone(),
            operation: scenario.operation,
            mismatches,
        })
    }

    /// Post-submit assertions for scenarios expected to succeed.
    fn assert_success(
        &mut self,
        scenario: &Scenario,
        target: Option<&ResourceName>,
        ctx: &mut SuiteContext,
        mismatches: &mut Vec<AssertionMismatch>,
    ) -> Result<(), RunnerError> {
        match scenario.operation {
            Operation::Create | Operation::Update | Operation::Clone => {
                let submitted = scenario.fields.get_or(&self.vocab.field_label, "");
                let stored_name = ResourceName::new(submitted).normalized();
                match self.repository.read(&stored_name)? {
                    Some(record) => {
                        if record.name != stored_name {
                            mismatches.push(AssertionMismatch::StoredValue {
                                field: self.vocab.field_label.clone(),
                                expected: stored_name.as_str().to_string(),
                                observed: record.name.as_str().to_string(),
                            });
                        }
                        // Clones are plain copies: the discovered flag never
                        // carries over from the source.
                        if scenario.operation == Operation::Clone && record.discovered {
                            mismatches.push(AssertionMismatch::StoredValue {
                                field: "discovered".to_string(),
                                expected: "false".to_string(),
                                observed: "true".to_string(),
                            });
                        }
                    }
                    None => {
                        mismatches.push(AssertionMismatch::MissingRow {
                            name: stored_name.as_str().to_string(),
                        });
                    }
                }
                if scenario.operation == Operation::Clone
                    && let Some(source) = target
                {
                    // Both the source and the clone must exist afterwards.
                    let source_count = self.repository.count(source)?;
                    if source_count != 1 {
                        mismatches.push(AssertionMismatch::RowCount {
                            name: source.normalized().as_str().to_string(),
                            expected: 1,
                            observed: source_count,
                        });
                    }
                }
                if scenario.operation == Operation::Update {
                    ctx.update_target = stored_name;
                }
            }
            Operation::Delete => {
                if let Some(target) = target {
                    let count = self.repository.count(target)?;
                    if count != 0 {
                        mismatches.push(AssertionMismatch::RowCount {
                            name: target.normalized().as_str().to_string(),
                            expected: 0,
                            observed: count,
                        });
                    }
                }
            }
            Operation::Cancel => {}
        }
        Ok(())
    }

    /// Submits the update form without changing any value: the flash reports
    /// an update, yet repository state must stay bit-identical.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the repository fails outside the submit
    /// path.
    pub fn check_unchanged_update(
        &mut self,
        ctx: &SuiteContext,
    ) -> Result<ScenarioReport, RunnerError> {
        let mut mismatches = Vec::new();
        let before = self.repository.snapshot()?;
        let mut fields = FieldMap::new();
        fields.insert(self.vocab.field_label.clone(), ctx.update_target.as_str());
        match self.driver.submit(Operation::Update, Some(&ctx.update_target), &fields) {
            Ok(observed) => {
                if observed.outcome != Outcome::Success {
                    mismatches.push(AssertionMismatch::Outcome {
                        expected: Outcome::Success,
                        observed: observed.outcome,
                    });
                }
                let expected_title = self.vocab.success_title(Operation::Update);
                if observed.title != expected_title {
                    mismatches.push(AssertionMismatch::Title {
                        expected: expected_title,
                        observed: observed.title,
                    });
                }
            }
            Err(err) => {
                mismatches.push(AssertionMismatch::Driver {
                    error: err.to_string(),
                });
            }
        }
        let after = self.repository.snapshot()?;
        if after != before {
            mismatches.push(AssertionMismatch::Snapshot {
                before,
                after,
            });
        }
        Ok(ScenarioReport {
            label: "unchanged update".to_string(),
            operation: Operation::Update,
            mismatches,
        })
    }

    /// Runs the hierarchy propagation checks in order against a shared
    /// subgroup fixture.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the repository fails outside the submit
    /// path.
    pub fn run_propagation_suite(
        &mut self,
        cases: &[PropagationCase],
    ) -> Result<ConformanceReport, RunnerError> {
        let mut report = ConformanceReport::default();
        for case in cases {
            report.scenarios.push(self.check_propagation(case)?);
        }
        Ok(report)
    }

    /// Runs one propagation case: create the new node, apply the ancestor's
    /// permissions to its subtree, then compare full access-rule state
    /// against the expected projection.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] when the repository fails outside the submit
    /// path.
    pub fn check_propagation(
        &mut self,
        case: &PropagationCase,
    ) -> Result<ScenarioReport, RunnerError> {
        let mut mismatches = Vec::new();
        if let Some(create) = &case.create {
            let mut fields = FieldMap::new();
            fields.insert(self.vocab.field_label.clone(), create.as_str());
            match self.driver.submit(Operation::Create, None, &fields) {
                Ok(observed) if observed.outcome == Outcome::Success => {}
                Ok(observed) => {
                    mismatches.push(AssertionMismatch::Outcome {
                        expected: Outcome::Success,
                        observed: observed.outcome,
                    });
                }
                Err(err) => {
                    mismatches.push(AssertionMismatch::Driver {
                        error: err.to_string(),
                    });
                }
            }
        }
        if let Err(err) = self.repository.apply_hierarchy_propagation(&case.apply_to) {
            mismatches.push(AssertionMismatch::Driver {
                error: err.to_string(),
            });
        }
        let observed = self.repository.access_rules()?;
        if observed != case.expected_rules {
            mismatches.push(AssertionMismatch::AccessRules {
                expected: case.expected_rules.clone(),
                observed,
            });
        }
        Ok(ScenarioReport {
            label: case.label.clone(),
            operation: Operation::Update,
            mismatches,
        })
    }
}
