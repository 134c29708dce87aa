// src/article.rs
//! Wire types shared by the upstream decoder and the public API.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Publisher attribution as reported upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One article exactly as received from upstream.
///
/// Fields the relay does not interpret are kept in `extra` so that a
/// forwarded page is byte-for-byte equivalent in content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub source: ArticleSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_to_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    /// Identity key; blank URLs count as missing.
    pub fn key(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Publication time in epoch milliseconds.
    ///
    /// Missing or unparsable timestamps resolve to `i64::MIN` so they sort
    /// as the oldest possible articles.
    pub fn published_millis(&self) -> i64 {
        self.published_at
            .as_deref()
            .and_then(resolve_timestamp)
            .unwrap_or(i64::MIN)
    }
}

/// Parse an upstream timestamp. NewsAPI sends RFC 3339 (`2024-01-15T10:00:00Z`),
/// but some sources omit the offset; those are read as UTC.
pub fn resolve_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Page of articles in the upstream response shape, also returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    #[serde(default = "ok_status")]
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
}

fn ok_status() -> String {
    "ok".to_string()
}

impl ArticlePage {
    pub fn ok(total_results: u64, articles: Vec<Article>) -> Self {
        Self {
            status: ok_status(),
            total_results,
            articles,
        }
    }

    pub fn empty() -> Self {
        Self::ok(0, Vec::new())
    }
}
