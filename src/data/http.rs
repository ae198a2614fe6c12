//! HTTP fetch capability for the rates API.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::error::AppError;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// GET a URL with query parameters and return the parsed JSON body.
///
/// Implementations log failures with request context and then return them;
/// they never retry.
pub trait JsonFetcher {
    fn fetch_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, AppError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fx-landing/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::fetch(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl JsonFetcher for HttpFetcher {
    fn fetch_json(&self, url: &str, params: &[(String, String)]) -> Result<Value, AppError> {
        let params_desc = describe_params(params);
        info!(url, params = %params_desc, "Fetching data from API");

        let result = self
            .client
            .get(url)
            .query(params)
            .send()
            .map_err(|e| AppError::fetch(format!("Rates request failed: {e}")))
            .and_then(|resp| {
                let status = resp.status();
                if !status.is_success() {
                    return Err(AppError::fetch(format!(
                        "Rates request failed with status {status}."
                    )));
                }
                resp.json::<Value>()
                    .map_err(|e| AppError::fetch(format!("Failed to parse rates response: {e}")))
            });

        if let Err(err) = &result {
            error!(url, params = %params_desc, error = %err, "Error fetching data from API");
        }
        result
    }
}

fn describe_params(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::serve_once;

    fn params() -> Vec<(String, String)> {
        vec![
            ("base".to_string(), "USD".to_string()),
            ("symbols".to_string(), "EUR,GBP".to_string()),
        ]
    }

    #[test]
    fn success_returns_parsed_body_and_sends_query() {
        let (addr, rx) = serve_once("200 OK", r#"{"base":"USD","rates":{"EUR":0.9}}"#);
        let fetcher = HttpFetcher::new().unwrap();

        let body = fetcher
            .fetch_json(&format!("{addr}/v1/latest"), &params())
            .unwrap();

        assert_eq!(body["base"], "USD");
        assert!(body.get("rates").is_some());
        let req = rx.recv().unwrap();
        assert_eq!(
            req.request_line,
            "GET /v1/latest?base=USD&symbols=EUR%2CGBP HTTP/1.1"
        );
    }

    #[test]
    fn non_success_status_is_a_fetch_error() {
        let (addr, _rx) = serve_once("503 Service Unavailable", "{}");
        let fetcher = HttpFetcher::new().unwrap();

        let err = fetcher
            .fetch_json(&format!("{addr}/v1/latest"), &params())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert!(err.to_string().contains("503"), "{err}");
    }

    #[test]
    fn connection_refused_is_a_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let fetcher = HttpFetcher::with_timeout(Duration::from_secs(2)).unwrap();

        let err = fetcher
            .fetch_json(&format!("http://{addr}/v1/latest"), &params())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Fetch);
    }
}
