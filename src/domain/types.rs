//! Shared domain types.
//!
//! The payload stays an untyped JSON object: it is landed
//! verbatim and only its `date` field is read.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::AppError;

/// JSON body returned by the rates API.
#[derive(Debug, Clone, PartialEq)]
pub struct RatePayload(Map<String, Value>);

impl RatePayload {
    /// Accept any JSON value; only objects are valid payloads.
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(AppError::data_contract(format!(
                "API payload is not a JSON object (got {})",
                json_type_name(&other)
            ))),
        }
    }

    /// The date the API says the rates belong to.
    ///
    /// Missing, empty, non-string and non-`YYYY-MM-DD` values are all
    /// data-contract violations. The string must already be canonical
    /// (zero-padded, unsigned, no surrounding whitespace) so the key built
    /// from the parsed date carries exactly the date the API reported.
    pub fn data_date(&self) -> Result<NaiveDate, AppError> {
        let raw = match self.0.get("date") {
            None | Some(Value::Null) => {
                return Err(AppError::data_contract(
                    "API payload does not contain 'date' field",
                ));
            }
            Some(Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(AppError::data_contract(format!(
                    "API payload 'date' field is not a string (got {})",
                    json_type_name(other)
                )));
            }
        };
        if raw.trim().is_empty() {
            return Err(AppError::data_contract(
                "API payload does not contain 'date' field",
            ));
        }
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| AppError::data_contract(format!("Invalid API date '{raw}': {e}")))?;
        if date.format("%Y-%m-%d").to_string() != raw {
            return Err(AppError::data_contract(format!(
                "Invalid API date '{raw}': expected YYYY-MM-DD"
            )));
        }
        Ok(date)
    }

    /// UTF-8 JSON text as landed in the bucket. Non-ASCII is kept literally.
    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(&self.0)
            .map_err(|e| AppError::data_contract(format!("Failed to serialize API payload: {e}")))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Object key for one source and one data date:
/// `raw/api=<source>/date=<YYYY-MM-DD>.json`.
///
/// Doubles as the idempotency key, so it must depend on nothing but its two
/// inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(source: &str, data_date: NaiveDate) -> Self {
        Self(format!(
            "raw/api={source}/date={}.json",
            data_date.format("%Y-%m-%d")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a run did at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Written,
    /// An object already existed at the key.
    Skipped,
    /// Dry run: the object is missing and would have been written.
    WouldWrite,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Written => "written",
            Outcome::Skipped => "skipped",
            Outcome::WouldWrite => "would-write",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub bucket: String,
    pub key: StorageKey,
    pub data_date: NaiveDate,
    pub run_date: NaiveDate,
    /// `data_date != run_date`. Informational only.
    pub stale: bool,
    pub outcome: Outcome,
}
