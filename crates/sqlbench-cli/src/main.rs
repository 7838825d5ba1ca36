mod logging;
mod redaction;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use sqlbench_compare::ResultComparator;
use sqlbench_core::{AbortFlag, Error as CoreError, SchemaModel};
use sqlbench_dialect::{SQL_1999, SqlRewriter};
use sqlbench_generate::{GenerationEngine, GenerationError};
use sqlbench_introspect::{IntrospectOptions, PostgresAccess, build_schema_model};
use thiserror::Error;

use logging::init_logging;
use redaction::redact_connection_string;
use settings::{HarnessSettings, load_settings};

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("generation stopped: {0}")]
    GenerationStopped(String),
    #[error("{failed} statement(s) could not be translated")]
    Rewrite { failed: usize },
    #[error("results are not equivalent: {0}")]
    NotEquivalent(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(name = "sqlbench", version, about = "SQL performance harness")]
struct Cli {
    /// Settings file (TOML).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Append JSON log lines to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert synthesized rows into a table.
    Generate(GenerateArgs),
    /// Translate a SQL script between dialects.
    Rewrite(RewriteArgs),
    /// Compare the results of two queries.
    Compare(CompareArgs),
    /// Print the metadata of a table.
    Describe(TableArgs),
}

#[derive(Args, Debug)]
struct TableArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: String,
    /// Table name.
    #[arg(long)]
    table: String,
    /// Schema name pattern. Defaults to the connection's current schema.
    #[arg(long)]
    schema: Option<String>,
    /// Dialect code of statements executed on this connection.
    #[arg(long, default_value = SQL_1999)]
    dialect: String,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    table: TableArgs,
    /// Number of rows to insert.
    #[arg(long, default_value_t = 1000)]
    rows: u64,
    /// Seed override for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
    /// Rows per transaction override.
    #[arg(long)]
    transaction_size: Option<u64>,
}

#[derive(Args, Debug)]
struct RewriteArgs {
    /// Script to translate.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    /// Source dialect code override.
    #[arg(long)]
    source: Option<String>,
    /// Target dialect code override.
    #[arg(long)]
    target: Option<String>,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Connection of the unapplied (baseline) query.
    #[arg(long, value_name = "CONNECTION_STRING")]
    unapplied_conn: String,
    /// Connection of the applied query. Defaults to the unapplied one.
    #[arg(long, value_name = "CONNECTION_STRING")]
    applied_conn: Option<String>,
    #[arg(long, default_value = SQL_1999)]
    unapplied_dialect: String,
    #[arg(long, default_value = SQL_1999)]
    applied_dialect: String,
    #[arg(long)]
    unapplied_select: String,
    #[arg(long)]
    applied_select: String,
    /// ORDER BY clause, or NOSORT.
    #[arg(long)]
    unapplied_order_by: String,
    /// ORDER BY clause, or NOSORT.
    #[arg(long)]
    applied_order_by: String,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Generate(args) => run_generate(args, settings),
        Command::Rewrite(args) => run_rewrite(args, settings),
        Command::Compare(args) => run_compare(args, settings),
        Command::Describe(args) => run_describe(args, settings),
    }
}

fn connect(conn: &str, dialect: &str) -> Result<PostgresAccess, CliError> {
    tracing::info!(
        event = "connecting",
        connection = %redact_connection_string(conn),
        dialect = %dialect
    );
    Ok(PostgresAccess::connect(conn, dialect)?)
}

fn load_model(
    db: &mut PostgresAccess,
    args: &TableArgs,
    options: &IntrospectOptions,
) -> Result<SchemaModel, CliError> {
    let model = build_schema_model(db, None, args.schema.as_deref(), &args.table, options)?;
    for line in model.describe() {
        tracing::info!(event = "metadata", "{line}");
    }
    Ok(model)
}

fn run_generate(args: GenerateArgs, settings: HarnessSettings) -> Result<(), CliError> {
    let HarnessSettings {
        mut generate,
        introspect,
        ..
    } = settings;
    if args.seed.is_some() {
        generate.seed = args.seed;
    }
    if let Some(transaction_size) = args.transaction_size {
        generate.transaction_size = transaction_size;
    }

    let timer = Instant::now();
    let mut db = connect(&args.table.conn, &args.table.dialect)?;
    let mut model = load_model(&mut db, &args.table, &introspect)?;

    let engine = GenerationEngine::new(generate);
    let mut rng = engine.rng_for(&model.table);
    let report =
        engine.generate_rows(&mut db, &mut model, args.rows, &mut rng, &AbortFlag::new())?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    tracing::info!(
        event = "run_finished",
        table = %model.table,
        duration_ms = timer.elapsed().as_millis() as u64
    );

    if let Some(issue) = report.failure {
        return Err(CliError::GenerationStopped(issue.message));
    }
    if report.aborted {
        return Err(CliError::GenerationStopped("aborted".to_string()));
    }
    Ok(())
}

fn run_rewrite(args: RewriteArgs, settings: HarnessSettings) -> Result<(), CliError> {
    let source = args.source.unwrap_or(settings.rewrite.source);
    let target = args.target.unwrap_or(settings.rewrite.target);
    let script = read_script(&args.input)?;

    let mut rewriter = SqlRewriter::new();
    let mut failed = 0;
    for rewrite in rewriter.rewrite_script(&source, &target, &script) {
        if let Some(error) = &rewrite.outcome.error {
            failed += 1;
            tracing::warn!(
                event = "statement_rejected",
                statement = %rewrite.statement,
                error = %error
            );
            continue;
        }
        if !rewrite.outcome.text.is_empty() {
            println!("{};", rewrite.outcome.text);
        }
    }

    tracing::info!(event = "rewrite_finished", source = %source, target = %target, failed);
    if failed > 0 {
        return Err(CliError::Rewrite { failed });
    }
    Ok(())
}

fn run_compare(args: CompareArgs, settings: HarnessSettings) -> Result<(), CliError> {
    let applied_conn = args
        .applied_conn
        .as_deref()
        .unwrap_or(&args.unapplied_conn);
    let mut unapplied = connect(&args.unapplied_conn, &args.unapplied_dialect)?;
    let mut applied = connect(applied_conn, &args.applied_dialect)?;

    let comparator = ResultComparator::new(settings.compare);
    let outcome = comparator.compare(
        [&mut unapplied, &mut applied],
        [
            Some(args.unapplied_select.as_str()),
            Some(args.applied_select.as_str()),
        ],
        [
            Some(args.unapplied_order_by.as_str()),
            Some(args.applied_order_by.as_str()),
        ],
        SQL_1999,
    );

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if outcome.equal {
        Ok(())
    } else {
        Err(CliError::NotEquivalent(outcome.message))
    }
}

fn run_describe(args: TableArgs, settings: HarnessSettings) -> Result<(), CliError> {
    let mut db = connect(&args.conn, &args.dialect)?;
    let model = build_schema_model(
        &mut db,
        None,
        args.schema.as_deref(),
        &args.table,
        &settings.introspect,
    )?;
    for line in model.describe() {
        println!("{line}");
    }
    Ok(())
}

fn read_script(path: &Path) -> Result<String, CliError> {
    let script = std::fs::read_to_string(path)?;
    tracing::debug!(event = "script_loaded", path = %path.display(), bytes = script.len());
    Ok(script)
}
