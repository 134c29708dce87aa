// src/upstream/newsapi.rs
//! reqwest-backed client for the NewsAPI v2 endpoints.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Client;
use serde::Deserialize;

use super::{Endpoint, UpstreamClient, UpstreamOutcome, UpstreamQuery};
use crate::article::ArticlePage;
use crate::config::AppConfig;
use crate::error::UpstreamError;

/// Status used when upstream answers 2xx but flags an error in the body.
const BODY_ERROR_STATUS: u16 = 502;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct NewsApiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .user_agent(concat!("headline-relay/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Build from process configuration. A missing key yields a client with an
    /// empty key; the query service refuses to call it in that state.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, UpstreamError> {
        Self::new(cfg.base_url.clone(), cfg.api_key.clone().unwrap_or_default())
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        query: &UpstreamQuery,
        timeout: Duration,
    ) -> UpstreamOutcome {
        let resp = self
            .http
            .get(self.url(endpoint))
            .timeout(timeout)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout(timeout)
                } else {
                    UpstreamError::from(e)
                }
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(UpstreamError::from)?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }

        let page: ArticlePage =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(e.to_string()))?;
        if page.status.eq_ignore_ascii_case("error") {
            return Err(UpstreamError::Status {
                status: BODY_ERROR_STATUS,
                message: error_message(&body).unwrap_or_else(|| "upstream error".to_string()),
            });
        }
        Ok(page)
    }
}

fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match (parsed.code, parsed.message) {
        (Some(code), Some(msg)) => Some(format!("{code}: {msg}")),
        (None, Some(msg)) => Some(msg),
        (Some(code), None) => Some(code),
        (None, None) => None,
    }
}

#[async_trait]
impl UpstreamClient for NewsApiClient {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        query: &UpstreamQuery,
        timeout: Duration,
    ) -> UpstreamOutcome {
        let t0 = Instant::now();
        let out = self.send(endpoint, query, timeout).await;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("upstream_request_ms", "endpoint" => endpoint.path()).record(ms);
        counter!("upstream_requests_total", "endpoint" => endpoint.path()).increment(1);

        match &out {
            Ok(page) => tracing::debug!(
                endpoint = endpoint.path(),
                country = query.country.as_deref().unwrap_or("-"),
                articles = page.articles.len(),
                elapsed_ms = ms as u64,
                "upstream ok"
            ),
            Err(e) => {
                counter!("upstream_failures_total", "endpoint" => endpoint.path()).increment(1);
                tracing::debug!(
                    endpoint = endpoint.path(),
                    country = query.country.as_deref().unwrap_or("-"),
                    error = %e,
                    "upstream failed"
                );
            }
        }
        out
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
