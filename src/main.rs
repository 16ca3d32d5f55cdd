//! Binary entry point for the doorbell CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Validate a kind declaration document and print the resolved table
//! doorbell check kinds.json
//!
//! # Evaluate an arithmetic expression tree
//! doorbell eval expr.json
//!
//! # Treat variables as 0 and log every hook phase
//! doorbell --log-level trace eval expr.json --lenient
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use doorbell::arith::{self, Evaluator, Expr, Printer};
use doorbell::error::{CliError, ExitCodeKind};
use doorbell::output::{emit_response, CheckResponse, ErrorResponse, EvalResponse};
use doorbell::KindDeclarations;

// ============================================================================
// CLI Structure
// ============================================================================

/// Double dispatch visitors with declared naming lineages.
///
/// All output is JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "doorbell", version, about = "Double dispatch visitors with declared naming lineages")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a kind declaration document and print the resolved table.
    Check {
        /// Path to the JSON declaration document.
        path: PathBuf,
    },

    /// Evaluate an arithmetic expression tree.
    Eval {
        /// Path to the JSON expression.
        path: PathBuf,

        /// Evaluate kinds without an operation (variables) as 0.
        #[arg(long)]
        lenient: bool,
    },
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = ExitCodeKind::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Check { path } => execute_check(&path),
        Command::Eval { path, lenient } => execute_eval(&path, lenient),
    }
}

fn read_input(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|err| {
        CliError::invalid_arguments(
            format!("cannot read {}: {err}", path.display()),
            Some(serde_json::json!({ "path": path.display().to_string() })),
        )
    })
}

fn execute_check(path: &Path) -> Result<(), CliError> {
    let declarations = KindDeclarations::from_json(&read_input(path)?)?;
    let table = declarations.to_registry()?.freeze()?;
    info!(kinds = table.len(), "declarations resolved");

    emit_response(&CheckResponse::new(&table), &mut io::stdout())?;
    Ok(())
}

fn execute_eval(path: &Path, lenient: bool) -> Result<(), CliError> {
    let expr = Expr::from_json(&read_input(path)?)?;
    let dispatcher = arith::dispatcher()?;

    let mut evaluator = Evaluator::new()?.lenient(lenient);
    let value = dispatcher.accept(&expr, &mut evaluator, ())?;

    let mut printer = Printer::new()?;
    let expression = dispatcher.accept(&expr, &mut printer, ())?;
    info!(%expression, value, "expression evaluated");

    let response = EvalResponse::new(expression, value, evaluator.nodes_visited());
    emit_response(&response, &mut io::stdout())?;
    Ok(())
}
