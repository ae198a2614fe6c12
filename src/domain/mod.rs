//! Domain types used throughout the ingest run.
//!
//! This module defines:
//!
//! - run configuration (`FetchConfig`)
//! - the landed payload and its idempotency key (`RatePayload`, `StorageKey`)
//! - the run result (`IngestReport`, `Outcome`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
