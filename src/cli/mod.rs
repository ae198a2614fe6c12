//! Command-line parsing for the exchange-rate landing job.
//!
//! Parsing stays separate from the ingest procedure so the procedure can be
//! driven directly from tests.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_SOURCE, Overrides};
use crate::logging::LogFormat;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "fx-ingest",
    version,
    about = "Land daily exchange rates as raw JSON in object storage"
)]
pub struct Cli {
    /// Log output format (stderr).
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the latest rates and land them unless already present.
    ///
    /// The bucket comes from GCS_BUCKET (a `.env` file is honoured).
    Ingest(IngestArgs),
    /// Print the object key used for a data date.
    Key(KeyArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct IngestArgs {
    /// Base currency (ISO 4217).
    #[arg(long)]
    pub base: Option<String>,

    /// Comma-separated target currencies, in request order.
    #[arg(long, value_delimiter = ',')]
    pub symbols: Option<Vec<String>>,

    /// Rates endpoint.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Source name used in the object key.
    #[arg(long)]
    pub source: Option<String>,

    /// Write to a local directory instead of Google Cloud Storage.
    #[arg(long, value_name = "DIR")]
    pub local_root: Option<PathBuf>,

    /// Fetch and check, but do not write.
    #[arg(long)]
    pub dry_run: bool,
}

impl IngestArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            source: self.source.clone(),
            base: self.base.clone(),
            targets: self.symbols.clone(),
            api_url: self.api_url.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Data date (YYYY-MM-DD).
    #[arg(long)]
    pub date: NaiveDate,

    #[arg(long, default_value = DEFAULT_SOURCE)]
    pub source: String,
}
