//! Google Cloud Storage over the JSON API.
//!
//! Existence checks use object metadata GETs (404 means absent). Writes use
//! a single media upload with `ifGenerationMatch=0`, so a write never replaces
//! an object that appeared after the existence check.

use std::cell::OnceCell;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::io::store::{ObjectStore, validate_key};

pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// How requests are authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GcsAuth {
    /// Fixed bearer token (`GCS_ACCESS_TOKEN`).
    Bearer(String),
    /// No `Authorization` header; for emulators.
    Anonymous,
    /// Default service account token from the metadata server.
    Metadata { host: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcsSettings {
    pub endpoint: Url,
    pub auth: GcsAuth,
    pub timeout: Duration,
}

impl GcsSettings {
    /// Resolution rules:
    ///
    /// - `GCS_ACCESS_TOKEN` wins when set.
    /// - a custom `GCS_ENDPOINT` without a token talks to it anonymously.
    /// - otherwise the metadata server (`GCE_METADATA_HOST`) supplies tokens.
    pub fn from_vars<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let custom_endpoint = get("GCS_ENDPOINT");
        let endpoint_raw = custom_endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let endpoint = Url::parse(endpoint_raw)
            .map_err(|e| AppError::config(format!("Invalid GCS_ENDPOINT '{endpoint_raw}': {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "GCS_ENDPOINT '{endpoint_raw}' is not a base URL."
            )));
        }

        let auth = match (get("GCS_ACCESS_TOKEN"), &custom_endpoint) {
            (Some(token), _) => GcsAuth::Bearer(token),
            (None, Some(_)) => GcsAuth::Anonymous,
            (None, None) => GcsAuth::Metadata {
                host: get("GCE_METADATA_HOST").unwrap_or_else(|| DEFAULT_METADATA_HOST.to_string()),
            },
        };

        let timeout = match get("GCS_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(AppError::config(format!(
                        "GCS_TIMEOUT_SECS must be a positive integer (got '{raw}')."
                    )));
                }
            },
        };

        Ok(Self {
            endpoint,
            auth,
            timeout,
        })
    }
}

pub struct GcsStore {
    client: Client,
    settings: GcsSettings,
    /// Metadata-server token, fetched on first use.
    token: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GcsStore {
    pub fn new(settings: GcsSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AppError::storage(format!("Failed to build GCS client: {e}")))?;
        Ok(Self {
            client,
            settings,
            token: OnceCell::new(),
        })
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<Url, AppError> {
        let mut url = self.settings.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::config("GCS endpoint is not a base URL."))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", bucket, "o", key]);
        Ok(url)
    }

    fn upload_url(&self, bucket: &str) -> Result<Url, AppError> {
        let mut url = self.settings.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::config("GCS endpoint is not a base URL."))?
            .pop_if_empty()
            .extend(["upload", "storage", "v1", "b", bucket, "o"]);
        Ok(url)
    }

    fn authorize(&self, req: RequestBuilder) -> Result<RequestBuilder, AppError> {
        match &self.settings.auth {
            GcsAuth::Bearer(token) => Ok(req.bearer_auth(token)),
            GcsAuth::Anonymous => Ok(req),
            GcsAuth::Metadata { host } => Ok(req.bearer_auth(self.metadata_token(host)?)),
        }
    }

    fn metadata_token(&self, host: &str) -> Result<String, AppError> {
        if let Some(token) = self.token.get() {
            return Ok(token.clone());
        }
        let token = self.fetch_metadata_token(host)?;
        Ok(self.token.get_or_init(|| token).clone())
    }

    fn fetch_metadata_token(&self, host: &str) -> Result<String, AppError> {
        let url = format!("http://{host}{TOKEN_PATH}");
        let resp = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .map_err(|e| AppError::storage(format!("GCS token request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AppError::storage(format!(
                "GCS token request failed with status {}.",
                resp.status()
            )));
        }
        let body: TokenResponse = resp
            .json()
            .map_err(|e| AppError::storage(format!("Failed to parse GCS token response: {e}")))?;
        Ok(body.access_token)
    }
}

impl ObjectStore for GcsStore {
    fn exists(&self, bucket: &str, key: &str) -> Result<bool, AppError> {
        validate_key(key)?;
        let url = self.object_url(bucket, key)?;
        debug!(%url, "checking object");

        let req = self.client.get(url).query(&[("fields", "name")]);
        let resp = self
            .authorize(req)?
            .send()
            .map_err(|e| AppError::storage(format!("GCS existence check failed: {e}")))?;

        match resp.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(status_error("GCS existence check", bucket, key, resp)),
        }
    }

    fn write(
        &self,
        bucket: &str,
        key: &str,
        payload: &str,
        content_type: &str,
    ) -> Result<(), AppError> {
        validate_key(key)?;
        let url = self.upload_url(bucket)?;

        let req = self
            .client
            .post(url)
            .query(&[
                ("uploadType", "media"),
                ("name", key),
                ("ifGenerationMatch", "0"),
            ])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(payload.to_owned());
        let resp = self
            .authorize(req)?
            .send()
            .map_err(|e| AppError::storage(format!("GCS upload failed: {e}")))?;

        match resp.status() {
            s if s.is_success() => {
                info!(bucket, blob_path = key, "Data uploaded to GCS");
                Ok(())
            }
            StatusCode::PRECONDITION_FAILED => Err(AppError::storage(format!(
                "gs://{bucket}/{key} was created by another writer after the existence check."
            ))),
            _ => Err(status_error("GCS upload", bucket, key, resp)),
        }
    }
}

fn status_error(what: &str, bucket: &str, key: &str, resp: Response) -> AppError {
    let status = resp.status();
    let body = resp.text().unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    AppError::storage(format!(
        "{what} for gs://{bucket}/{key} failed with status {status}: {snippet}"
    ))
}
