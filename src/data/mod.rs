//! Upstream data access.

pub mod http;

pub use http::{HttpFetcher, JsonFetcher};
