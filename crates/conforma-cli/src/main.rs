// crates/conforma-cli/src/main.rs
// ============================================================================
// Module: Conforma CLI Entry Point
// Description: Command dispatcher for the conformance suite runner.
// Purpose: Run suites against a chosen backend and report divergences.
// Dependencies: clap, conforma-core, conforma-store-sqlite, serde_json, thiserror, toml
// ============================================================================

//! ## Overview
//! The Conforma CLI runs the CRUD and subgroup propagation suites against
//! either the in-memory reference registry or the `SQLite` backend, then
//! reports per-scenario divergences as text or canonical JSON. The process
//! exits non-zero when any scenario diverges, so the binary slots directly
//! into CI pipelines.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod config;
#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use conforma_core::AssertionMismatch;
use conforma_core::ConformanceReport;
use conforma_core::ConformanceRunner;
use conforma_core::Operation;
use conforma_core::Outcome;
use conforma_core::RegistryFormDriver;
use conforma_core::Scenario;
use conforma_core::ScenarioCatalog;
use conforma_core::SharedRepository;
use conforma_core::Vocabulary;
use conforma_core::base_registry;
use conforma_core::interfaces::ResourceRepository;
use conforma_core::subgroup_cases;
use conforma_core::subgroup_registry;
use conforma_store_sqlite::SqliteRegistry;
use conforma_store_sqlite::SqliteStoreConfig;
use thiserror::Error;

use crate::config::Backend;
use crate::config::ConformaConfig;
use crate::config::ReportFormat;
use crate::config::Suite;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "conforma", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a conformance suite and report divergences.
    Run(RunCommand),
    /// List the scenario catalog without running it.
    Scenarios(ScenariosCommand),
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
struct RunCommand {
    /// Optional config file path (defaults to conforma.toml when present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Repository backend (overrides config).
    #[arg(long, value_enum, value_name = "BACKEND")]
    backend: Option<Backend>,
    /// Suite to run.
    #[arg(long, value_enum, default_value_t = Suite::Crud)]
    suite: Suite,
    /// Report output format (overrides config).
    #[arg(long, value_enum, value_name = "FORMAT")]
    format: Option<ReportFormat>,
    /// `SQLite` database path (overrides config; sqlite backend only).
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

/// Arguments for the `scenarios` command.
#[derive(Args, Debug)]
struct ScenariosCommand {
    /// Restrict the listing to one operation.
    #[arg(long, value_enum, value_name = "OPERATION")]
    operation: Option<OperationArg>,
    /// Listing output format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

/// Operation filter for the `scenarios` command.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum OperationArg {
    /// Create scenarios.
    Create,
    /// Update scenarios.
    Update,
    /// Clone scenarios.
    Clone,
    /// Delete scenarios.
    Delete,
    /// Cancel scenarios.
    Cancel,
}

impl From<OperationArg> for Operation {
    fn from(value: OperationArg) -> Self {
        match value {
            OperationArg::Create => Self::Create,
            OperationArg::Update => Self::Update,
            OperationArg::Clone => Self::Clone,
            OperationArg::Delete => Self::Delete,
            OperationArg::Cancel => Self::Cancel,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Formats an output stream failure.
fn output_error(stream: &str, err: &std::io::Error) -> String {
    format!("failed to write to {stream}: {err}")
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("conforma {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        write_stdout_line("run `conforma --help` for usage")
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    };
    match command {
        Commands::Run(command) => command_run(command),
        Commands::Scenarios(command) => command_scenarios(&command),
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Runs a suite against the selected backend and reports the result.
fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let loaded = ConformaConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let backend = command.backend.unwrap_or(loaded.suite.backend);
    let format = command.format.unwrap_or(loaded.suite.format);
    let vocab = Vocabulary::host_groups();

    let report = match backend {
        Backend::Memory => {
            let fixture = match command.suite {
                Suite::Crud => base_registry(vocab.clone()),
                Suite::Subgroups => subgroup_registry(vocab.clone()),
            };
            execute_suite(fixture, &vocab, command.suite)?
        }
        Backend::Sqlite => {
            let store_config = SqliteStoreConfig {
                path: command.db.unwrap_or(loaded.store.path),
                busy_timeout_ms: loaded.store.busy_timeout_ms,
                journal_mode: loaded.store.journal_mode,
                sync_mode: loaded.store.sync_mode,
            };
            let mut registry = SqliteRegistry::open(&store_config, vocab.clone())
                .map_err(|err| CliError::new(err.to_string()))?;
            let fixture = match command.suite {
                Suite::Crud => base_registry(vocab.clone()),
                Suite::Subgroups => subgroup_registry(vocab.clone()),
            };
            registry
                .import(&fixture.state())
                .map_err(|err| CliError::new(err.to_string()))?;
            execute_suite(registry, &vocab, command.suite)?
        }
    };

    emit_report(&report, format)?;
    if report.passed() { Ok(ExitCode::SUCCESS) } else { Ok(ExitCode::FAILURE) }
}

/// Runs the selected suite over any repository implementation.
fn execute_suite<R>(
    repository: R,
    vocab: &Vocabulary,
    suite: Suite,
) -> CliResult<ConformanceReport>
where
    R: ResourceRepository,
{
    let shared = SharedRepository::new(repository);
    let driver = RegistryFormDriver::new(shared.clone(), vocab.clone());
    let mut runner =
        ConformanceRunner::new(driver, shared, ScenarioCatalog::new(vocab.clone()));
    let report = match suite {
        Suite::Crud => runner.run_all(),
        Suite::Subgroups => runner.run_propagation_suite(&subgroup_cases()),
    };
    report.map_err(|err| CliError::new(err.to_string()))
}

/// Writes the report in the selected format.
fn emit_report(report: &ConformanceReport, format: ReportFormat) -> CliResult<()> {
    let rendered = match format {
        ReportFormat::Text => render_text_report(report),
        ReportFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|err| CliError::new(format!("failed to serialize report: {err}")))?,
    };
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Renders the human-readable report.
fn render_text_report(report: &ConformanceReport) -> String {
    let mut lines = Vec::new();
    for scenario in &report.scenarios {
        let status = if scenario.passed() { "PASS" } else { "FAIL" };
        let operation = scenario.operation.to_string();
        lines.push(format!("{status}  {operation:<7}  {}", scenario.label));
        for mismatch in &scenario.mismatches {
            lines.push(format!("      mismatch: {}", describe_mismatch(mismatch)));
        }
    }
    let verdict = if report.passed() { "conformant" } else { "divergent" };
    lines.push(format!(
        "{} scenarios, {} divergences: {verdict}",
        report.scenarios.len(),
        report.divergences()
    ));
    lines.join("\n")
}

/// Renders one divergence as a single line.
fn describe_mismatch(mismatch: &AssertionMismatch) -> String {
    let outcome_label = |outcome: Outcome| match outcome {
        Outcome::Success => "success",
        Outcome::Failure => "failure",
    };
    let option_label =
        |value: &Option<String>| value.clone().unwrap_or_else(|| "(none)".to_string());
    match mismatch {
        AssertionMismatch::Outcome {
            expected,
            observed,
        } => {
            format!(
                "outcome: expected {}, observed {}",
                outcome_label(*expected),
                outcome_label(*observed)
            )
        }
        AssertionMismatch::Title {
            expected,
            observed,
        } => {
            format!(
                "title: expected \"{}\", observed \"{}\"",
                option_label(expected),
                option_label(observed)
            )
        }
        AssertionMismatch::Message {
            expected,
            observed,
        } => format!("message: expected \"{expected}\", observed {}", observed.join(" | ")),
        AssertionMismatch::Snapshot {
            before,
            after,
        } => format!(
            "snapshot: state changed from {} to {}",
            before.digest().value,
            after.digest().value
        ),
        AssertionMismatch::MissingRow {
            name,
        } => format!("missing row: \"{name}\""),
        AssertionMismatch::StoredValue {
            field,
            expected,
            observed,
        } => {
            format!("stored value: field \"{field}\" expected \"{expected}\", stored \"{observed}\"")
        }
        AssertionMismatch::RowCount {
            name,
            expected,
            observed,
        } => format!("row count: \"{name}\" expected {expected}, observed {observed}"),
        AssertionMismatch::AccessRules {
            expected,
            observed,
        } => format!(
            "access rules: expected {} rules, observed {}",
            expected.len(),
            observed.len()
        ),
        AssertionMismatch::Driver {
            error,
        } => format!("driver error: {error}"),
    }
}

// ============================================================================
// SECTION: Scenarios Command
// ============================================================================

/// Lists the scenario catalog.
fn command_scenarios(command: &ScenariosCommand) -> CliResult<ExitCode> {
    let catalog = ScenarioCatalog::default();
    let operations: Vec<Operation> = match command.operation {
        Some(operation) => vec![operation.into()],
        None => Operation::ALL.to_vec(),
    };
    let scenarios: Vec<Scenario> =
        operations.iter().flat_map(|operation| catalog.scenarios(*operation)).collect();
    let rendered = match command.format {
        ReportFormat::Text => render_text_scenarios(&scenarios),
        ReportFormat::Json => serde_json::to_string_pretty(&scenarios)
            .map_err(|err| CliError::new(format!("failed to serialize scenarios: {err}")))?,
    };
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Renders the human-readable catalog listing.
fn render_text_scenarios(scenarios: &[Scenario]) -> String {
    let mut lines = Vec::new();
    for scenario in scenarios {
        let expected = match scenario.expected {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        };
        let operation = scenario.operation.to_string();
        lines.push(format!("{operation:<7}  {expected:<7}  {}", scenario.label));
    }
    lines.push(format!("{} scenarios", scenarios.len()));
    lines.join("\n")
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Reports an error to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {message}"));
    ExitCode::FAILURE
}
