// src/upstream/mod.rs
//! Upstream news source seam.
//!
//! `UpstreamClient` performs exactly one GET against the news API. The
//! relay logic only depends on this trait; `newsapi::NewsApiClient` is the
//! production implementation.

pub mod newsapi;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::article::ArticlePage;
use crate::error::UpstreamError;

/// Result of one upstream call; consumed by the merge step or the fallback router.
pub type UpstreamOutcome = Result<ArticlePage, UpstreamError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    TopHeadlines,
    Everything,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::TopHeadlines => "top-headlines",
            Endpoint::Everything => "everything",
        }
    }
}

/// Query parameters for one upstream call. Unset fields are omitted from the
/// query string entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl UpstreamQuery {
    /// Per-region headline query used by the fan-out.
    pub fn region(country: &str, category: Option<&str>, q: Option<&str>, page_size: u32) -> Self {
        Self {
            country: Some(country.to_string()),
            category: category.map(str::to_string),
            q: q.map(str::to_string),
            page: 1,
            page_size,
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// One GET against `endpoint` with the given query and timeout.
    async fn fetch(
        &self,
        endpoint: Endpoint,
        query: &UpstreamQuery,
        timeout: Duration,
    ) -> UpstreamOutcome;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_are_not_serialized() {
        let q = UpstreamQuery::region("de", None, Some("energy"), 5);
        let v = serde_json::to_value(&q).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"country": "de", "q": "energy", "page": 1, "pageSize": 5})
        );
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::TopHeadlines.path(), "top-headlines");
        assert_eq!(Endpoint::Everything.path(), "everything");
    }
}
