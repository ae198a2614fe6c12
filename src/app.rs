//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - scopes the logging dispatch to the run
//! - builds the HTTP and storage clients
//! - runs the ingest pipeline and prints a summary

use chrono::Local;
use clap::Parser;
use tracing::error;

use crate::cli::{Command, IngestArgs, KeyArgs};
use crate::data::HttpFetcher;
use crate::domain::{BUCKET_VAR, FetchConfig, StorageKey, validate_source};
use crate::error::AppError;
use crate::io::{GcsSettings, GcsStore, LocalStore, ObjectStore};

pub mod pipeline;

/// Entry point for the `fx-ingest` binary.
pub fn run() -> Result<(), AppError> {
    // The scheduler calls the bare binary, so `fx-ingest` must mean
    // `fx-ingest ingest`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let dispatch = crate::logging::build_dispatch(cli.log_format);
    tracing::dispatcher::with_default(&dispatch, || {
        let result = match cli.command {
            Command::Ingest(args) => handle_ingest(args),
            Command::Key(args) => handle_key(args),
        };
        if let Err(err) = &result {
            error!(exit_code = err.exit_code(), error = %err, "Run failed");
        }
        result
    })
}

fn handle_ingest(args: IngestArgs) -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // Everything configurable fails here, before any client exists.
    let (config, store) = prepare_ingest(|name| std::env::var(name).ok(), &args)?;
    let fetcher = HttpFetcher::new()?;

    let options = pipeline::RunOptions {
        dry_run: args.dry_run,
    };
    let run_date = Local::now().date_naive();
    let report = pipeline::run_ingest(&config, &fetcher, store.as_ref(), run_date, options)?;

    let location = match &args.local_root {
        Some(dir) => dir.join(&report.bucket).display().to_string(),
        None => format!("gs://{}", report.bucket),
    };
    println!("{}", crate::report::format_summary(&report, &location));
    Ok(())
}

/// Resolve the run configuration, then the storage backend.
///
/// `GCS_BUCKET` is checked first so a missing bucket is always the reported
/// error, whatever else is misconfigured.
fn prepare_ingest<F>(
    lookup: F,
    args: &IngestArgs,
) -> Result<(FetchConfig, Box<dyn ObjectStore>), AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = FetchConfig::from_vars(&lookup, &args.overrides())?;
    let store: Box<dyn ObjectStore> = match &args.local_root {
        Some(dir) => Box::new(LocalStore::new(dir)),
        None => Box::new(GcsStore::new(GcsSettings::from_vars(&lookup)?)?),
    };
    Ok((config, store))
}

fn handle_key(args: KeyArgs) -> Result<(), AppError> {
    let source = validate_source(&args.source)?;
    println!("{}", StorageKey::new(&source, args.date));
    Ok(())
}

/// Rewrite argv so `fx-ingest` defaults to `fx-ingest ingest`.
///
/// Rules:
/// - `fx-ingest`                     -> `fx-ingest ingest`
/// - `fx-ingest --dry-run ...`       -> `fx-ingest ingest --dry-run ...`
/// - `fx-ingest --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("ingest".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "ingest" | "key");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "ingest".to_string());
        return argv;
    }

    argv
}
