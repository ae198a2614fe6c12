//! The ingest procedure: fetch -> validate -> key -> freshness -> dedupe -> write.
//!
//! Both capabilities are passed in, so the whole sequence runs against
//! in-memory fakes in tests. Nothing here retries; every failure goes back to
//! the caller untouched.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::data::JsonFetcher;
use crate::domain::{FetchConfig, IngestReport, Outcome, RatePayload, StorageKey};
use crate::error::AppError;
use crate::io::{JSON_CONTENT_TYPE, ObjectStore};

/// Per-run switches that are not part of the fetch configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Check everything, write nothing.
    pub dry_run: bool,
}

/// Execute one ingest run for `run_date`.
pub fn run_ingest(
    config: &FetchConfig,
    fetcher: &dyn JsonFetcher,
    store: &dyn ObjectStore,
    run_date: NaiveDate,
    options: RunOptions,
) -> Result<IngestReport, AppError> {
    let execution_date = run_date.format("%Y-%m-%d").to_string();
    info!(
        source = %config.source,
        execution_date = %execution_date,
        base = %config.base,
        targets = %config.targets.join(","),
        "Starting ingestion"
    );

    // 1) Fetch.
    let body = fetcher.fetch_json(&config.api_url, &config.query_params())?;

    // 2) Validate the one field we rely on.
    let payload = RatePayload::from_value(body)?;
    let data_date = payload.data_date()?;

    // 3) Key on the data's own date, not the run date.
    let key = StorageKey::new(&config.source, data_date);

    // 4) Freshness is informational only.
    let stale = data_date != run_date;
    if stale {
        info!(
            data_date = %data_date,
            execution_date = %execution_date,
            "API returned stale data"
        );
    }

    // 5) Idempotency.
    let outcome = if store.exists(&config.bucket, key.as_str())? {
        warn!(
            blob_path = %key,
            "Raw data already exists for data date. Skipping ingestion."
        );
        Outcome::Skipped
    } else if options.dry_run {
        info!(blob_path = %key, "Dry run: raw data would be uploaded");
        Outcome::WouldWrite
    } else {
        store.write(
            &config.bucket,
            key.as_str(),
            &payload.to_json()?,
            JSON_CONTENT_TYPE,
        )?;
        info!(blob_path = %key, "Raw data uploaded successfully");
        Outcome::Written
    };

    info!(outcome = outcome.label(), "Ingestion finished successfully");

    Ok(IngestReport {
        bucket: config.bucket.clone(),
        key,
        data_date,
        run_date,
        stale,
        outcome,
    })
}
