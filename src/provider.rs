//! Stats endpoint client.
//!
//! Fetches current engagement counters for a resource id. The endpoint is a
//! plain GET against `{base}/{id}` whose JSON body carries the counters under
//! `meta.resource`. Everything downstream talks to the [`StatsProvider`]
//! trait so tests can substitute a mock server or a scripted fake.

use crate::error::{Result, TrackError};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Production stats endpoint. Override with the `FILEPULSE_STATS_URL`
/// environment variable.
pub const DEFAULT_STATS_BASE_URL: &str = "https://community.docfile.net/api/v1/files";

/// Request timeout for a single stats fetch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Current engagement counters for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStats {
    /// Display name as reported by the endpoint.
    pub name: String,
    /// Current community member count.
    pub user_count: u64,
    /// Current cumulative like count.
    pub like_count: u64,
}

/// Source of current engagement counters for tracked resources.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Fetch current counters for a resource id.
    async fn fetch(&self, id: &str) -> Result<ResourceStats>;
}

/// Stats response body: `{"meta": {"resource": {...}}}`.
#[derive(Debug, Deserialize)]
struct StatsResponse {
    meta: StatsMeta,
}

#[derive(Debug, Deserialize)]
struct StatsMeta {
    resource: StatsResource,
}

#[derive(Debug, Deserialize)]
struct StatsResource {
    name: String,
    user_count: u64,
    like_count: u64,
}

/// HTTP implementation of [`StatsProvider`].
pub struct HttpStatsProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpStatsProvider {
    /// Build a provider against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TrackError::Provider(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Build a provider against the production endpoint, honoring the
    /// `FILEPULSE_STATS_URL` override.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("FILEPULSE_STATS_URL")
            .unwrap_or_else(|_| DEFAULT_STATS_BASE_URL.to_owned());
        Self::new(base_url)
    }

    fn stats_url(&self, id: &str) -> String {
        format!("{}/{id}", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl StatsProvider for HttpStatsProvider {
    async fn fetch(&self, id: &str) -> Result<ResourceStats> {
        let url = self.stats_url(id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TrackError::Provider(format!("stats request for {id} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(TrackError::Provider(format!(
                "stats request for {id} rejected ({status})"
            )));
        }

        let body: StatsResponse = response
            .json()
            .await
            .map_err(|e| TrackError::Provider(format!("cannot decode stats for {id}: {e}")))?;

        Ok(ResourceStats {
            name: body.meta.resource.name,
            user_count: body.meta.resource.user_count,
            like_count: body.meta.resource.like_count,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn response_body_parses() {
        let json = r#"{
            "meta": {
                "resource": {
                    "name": "Design Handbook",
                    "user_count": 12345,
                    "like_count": 678
                }
            }
        }"#;
        let body: StatsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.meta.resource.name, "Design Handbook");
        assert_eq!(body.meta.resource.user_count, 12_345);
        assert_eq!(body.meta.resource.like_count, 678);
    }

    #[test]
    fn response_body_ignores_extra_fields() {
        let json = r#"{
            "meta": {
                "request_id": "abc",
                "resource": {
                    "name": "f",
                    "user_count": 1,
                    "like_count": 2,
                    "owner": "someone"
                }
            },
            "data": {}
        }"#;
        let body: StatsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.meta.resource.user_count, 1);
    }

    #[test]
    fn stats_url_joins_without_double_slash() {
        let provider = HttpStatsProvider::new("http://localhost:9999/api/").expect("provider");
        assert_eq!(provider.stats_url("123"), "http://localhost:9999/api/123");

        let provider = HttpStatsProvider::new("http://localhost:9999/api").expect("provider");
        assert_eq!(provider.stats_url("123"), "http://localhost:9999/api/123");
    }
}
