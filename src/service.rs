// src/service.rs
//! # Query Service
//! Request boundary: normalizes raw query parameters, refuses to work without
//! an access key, and dispatches to a direct upstream call or the aggregation
//! engine. Every primary outcome is handed to the fallback router.

use std::sync::Arc;

use tracing::debug;

use crate::aggregate::{AggregateRequest, AggregationEngine};
use crate::article::ArticlePage;
use crate::config::{AppConfig, ENV_API_KEY};
use crate::error::{Intent, QueryError};
use crate::fallback::{FallbackQuery, FallbackRouter};
use crate::upstream::{Endpoint, UpstreamClient, UpstreamQuery};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page NewsAPI will serve.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_SORT_BY: &str = "publishedAt";
pub const DEFAULT_LANGUAGE: &str = "en";
/// Search term sent upstream when the caller gave none.
pub const DEFAULT_SEARCH_TERM: &str = "news";
/// Region selector value that triggers the multi-region fan-out.
pub const ALL_REGIONS_SENTINEL: &str = "all";

/// Raw `/api/top-headlines` query. Everything is a string so malformed
/// numbers can be coerced instead of rejected.
#[derive(Debug, Clone, Default)]
pub struct RawHeadlinesParams {
    pub country: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
}

/// Raw `/api/everything` query.
#[derive(Debug, Clone, Default)]
pub struct RawSearchParams {
    pub q: Option<String>,
    pub sort_by: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub language: Option<String>,
}

/// First value for `key`. A repeated key never invalidates the other fields.
fn first(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

impl RawHeadlinesParams {
    /// Build from decoded query-string pairs.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            country: first(pairs, "country"),
            category: first(pairs, "category"),
            q: first(pairs, "q"),
            page: first(pairs, "page"),
            page_size: first(pairs, "pageSize"),
            sort_by: first(pairs, "sortBy"),
        }
    }
}

impl RawSearchParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            q: first(pairs, "q"),
            sort_by: first(pairs, "sortBy"),
            page: first(pairs, "page"),
            page_size: first(pairs, "pageSize"),
            language: first(pairs, "language"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionSelector {
    All,
    One(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlinesParams {
    pub region: RegionSelector,
    pub category: Option<String>,
    pub term: Option<String>,
    pub page: u32,
    pub page_size: u32,
    /// Accepted for client compatibility; top-headlines has no sort option.
    pub sort_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// What the caller typed, if anything.
    pub term: Option<String>,
    pub sort_by: String,
    pub page: u32,
    pub page_size: u32,
    pub language: String,
}

/// Trimmed value, with empty strings read as unset.
fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Coerce a raw number to a positive integer, falling back to `default`.
/// Decimals are truncated; anything unparsable or below 1 takes the default.
pub fn coerce_positive(raw: Option<&str>, default: u32) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return default;
    };
    let parsed = raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    });
    match parsed {
        Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => default,
    }
}

fn coerce_page_size(raw: Option<&str>) -> u32 {
    coerce_positive(raw, DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
}

impl HeadlinesParams {
    pub fn normalize(raw: RawHeadlinesParams, default_country: &str) -> Self {
        let country = non_empty(raw.country)
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or_else(|| default_country.to_string());
        let region = if country == ALL_REGIONS_SENTINEL {
            RegionSelector::All
        } else {
            RegionSelector::One(country)
        };
        Self {
            region,
            category: non_empty(raw.category),
            term: non_empty(raw.q),
            page: coerce_positive(raw.page.as_deref(), DEFAULT_PAGE),
            page_size: coerce_page_size(raw.page_size.as_deref()),
            sort_by: non_empty(raw.sort_by).unwrap_or_else(|| DEFAULT_SORT_BY.to_string()),
        }
    }
}

impl SearchParams {
    pub fn normalize(raw: RawSearchParams) -> Self {
        Self {
            term: non_empty(raw.q),
            sort_by: non_empty(raw.sort_by).unwrap_or_else(|| DEFAULT_SORT_BY.to_string()),
            page: coerce_positive(raw.page.as_deref(), DEFAULT_PAGE),
            page_size: coerce_page_size(raw.page_size.as_deref()),
            language: non_empty(raw.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        }
    }

    fn upstream_query(&self) -> UpstreamQuery {
        UpstreamQuery {
            q: Some(
                self.term
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SEARCH_TERM.to_string()),
            ),
            sort_by: Some(self.sort_by.clone()),
            language: Some(self.language.clone()),
            page: self.page,
            page_size: self.page_size,
            ..Default::default()
        }
    }
}

pub struct QueryService {
    config: Arc<AppConfig>,
    client: Arc<dyn UpstreamClient>,
    engine: AggregationEngine,
    fallback: FallbackRouter,
}

impl QueryService {
    pub fn new(config: Arc<AppConfig>, client: Arc<dyn UpstreamClient>) -> Self {
        let engine = AggregationEngine::new(Arc::clone(&client), config.aggregate_timeout);
        let fallback = FallbackRouter::new(engine.clone(), config.regions.clone());
        Self {
            config,
            client,
            engine,
            fallback,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn ensure_configured(&self) -> Result<(), QueryError> {
        if self.config.is_configured() {
            Ok(())
        } else {
            Err(QueryError::NotConfigured(ENV_API_KEY))
        }
    }

    /// `/api/top-headlines`
    pub async fn top_headlines(&self, raw: RawHeadlinesParams) -> Result<ArticlePage, QueryError> {
        self.ensure_configured()?;
        let params = HeadlinesParams::normalize(raw, &self.config.default_country);
        debug!(?params, "top headlines");

        match params.region {
            RegionSelector::All => {
                let req = AggregateRequest {
                    regions: self.config.regions.clone(),
                    category: params.category,
                    term: params.term,
                    page: params.page,
                    page_size: params.page_size,
                };
                self.engine
                    .aggregate(&req)
                    .await
                    .map(ArticlePage::from)
                    .map_err(|source| QueryError::Aggregate {
                        intent: Intent::Headlines,
                        source,
                    })
            }
            RegionSelector::One(country) => {
                let query = UpstreamQuery {
                    country: Some(country.clone()),
                    category: params.category.clone(),
                    q: params.term.clone(),
                    page: params.page,
                    page_size: params.page_size,
                    ..Default::default()
                };
                let outcome = self
                    .client
                    .fetch(Endpoint::TopHeadlines, &query, self.config.upstream_timeout)
                    .await;
                self.fallback
                    .resolve(
                        Intent::Headlines,
                        outcome,
                        FallbackQuery {
                            regions: Some(vec![country]),
                            category: params.category,
                            term: params.term,
                            page: params.page,
                            page_size: params.page_size,
                        },
                    )
                    .await
            }
        }
    }

    /// `/api/everything`
    pub async fn search(&self, raw: RawSearchParams) -> Result<ArticlePage, QueryError> {
        self.ensure_configured()?;
        let params = SearchParams::normalize(raw);
        debug!(?params, "search");

        let outcome = self
            .client
            .fetch(
                Endpoint::Everything,
                &params.upstream_query(),
                self.config.upstream_timeout,
            )
            .await;

        self.fallback
            .resolve(
                Intent::Search,
                outcome,
                FallbackQuery {
                    regions: None,
                    category: None,
                    term: params.term,
                    page: params.page,
                    page_size: params.page_size,
                },
            )
            .await
    }
}
