//! Run configuration.
//!
//! The bucket is the only value taken from the environment; everything else
//! has a static default that the CLI may override.

use crate::error::AppError;

pub const DEFAULT_SOURCE: &str = "frankfurter";
pub const DEFAULT_BASE: &str = "USD";
pub const DEFAULT_TARGETS: [&str; 3] = ["EUR", "GBP", "JPY"];
pub const DEFAULT_API_URL: &str = "https://api.frankfurter.dev/v1/latest";

pub const BUCKET_VAR: &str = "GCS_BUCKET";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub bucket: String,
    pub source: String,
    pub base: String,
    /// Ordered, deduplicated, upper-case ISO 4217 codes.
    pub targets: Vec<String>,
    pub api_url: String,
}

/// Optional CLI-level replacements for the static defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<String>,
    pub base: Option<String>,
    pub targets: Option<Vec<String>>,
    pub api_url: Option<String>,
}

impl FetchConfig {
    /// `lookup` resolves environment variable names; the process environment
    /// in production, a closure over fixed values in tests.
    pub fn from_vars<F>(lookup: F, overrides: &Overrides) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bucket = lookup(BUCKET_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::config(format!("{BUCKET_VAR} environment variable is not set"))
            })?;

        let source = match &overrides.source {
            Some(s) => validate_source(s)?,
            None => DEFAULT_SOURCE.to_string(),
        };
        let base = match &overrides.base {
            Some(b) => normalize_currency(b)?,
            None => DEFAULT_BASE.to_string(),
        };
        let targets = match &overrides.targets {
            Some(t) => normalize_targets(t)?,
            None => DEFAULT_TARGETS.iter().map(|c| c.to_string()).collect(),
        };
        let api_url = match &overrides.api_url {
            Some(u) => validate_url(u)?,
            None => DEFAULT_API_URL.to_string(),
        };

        Ok(Self {
            bucket,
            source,
            base,
            targets,
            api_url,
        })
    }

    /// Query parameters for the rates endpoint.
    pub fn query_params(&self) -> Vec<(String, String)> {
        vec![
            ("base".to_string(), self.base.clone()),
            ("symbols".to_string(), self.targets.join(",")),
        ]
    }
}

fn normalize_currency(raw: &str) -> Result<String, AppError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::config(format!(
            "Invalid currency code '{raw}' (expected 3 letters)."
        )));
    }
    Ok(code)
}

fn normalize_targets(raw: &[String]) -> Result<Vec<String>, AppError> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for item in raw {
        let code = normalize_currency(item)?;
        if !out.contains(&code) {
            out.push(code);
        }
    }
    if out.is_empty() {
        return Err(AppError::config("At least one target currency is required."));
    }
    Ok(out)
}

/// Source names end up as a key path segment.
pub fn validate_source(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        return Err(AppError::config(format!(
            "Invalid source name '{raw}' (use letters, digits, '-' or '_')."
        )));
    }
    Ok(name.to_string())
}

fn validate_url(raw: &str) -> Result<String, AppError> {
    let url = reqwest::Url::parse(raw.trim())
        .map_err(|e| AppError::config(format!("Invalid API URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        other => Err(AppError::config(format!(
            "Unsupported API URL scheme '{other}'."
        ))),
    }
}
