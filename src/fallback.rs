// src/fallback.rs
//! # Fallback Router
//! Decides what to do with the primary upstream outcome of a request.
//!
//! Some upstream plans refuse free-text search (401/403/426) while always
//! allowing headline browsing. A search refused that way is answered with a
//! headline aggregation over the same parameters, returned as a normal 200.
//! Every other failure is surfaced unchanged. A replacement in which every
//! region failed is itself a failure and reports the first region's error.

use metrics::counter;
use tracing::{info, warn};

use crate::aggregate::{AggregateRequest, AggregationEngine};
use crate::article::ArticlePage;
use crate::error::{FailureClass, Intent, QueryError, UpstreamError};
use crate::upstream::UpstreamOutcome;

#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    /// Primary call succeeded; answer with its page.
    UseResult(ArticlePage),
    /// Re-run the request through the headline aggregation strategy.
    Retry,
    /// Surface the failure to the caller as-is.
    Propagate(UpstreamError),
}

/// Pure routing policy.
pub fn route(intent: Intent, outcome: UpstreamOutcome) -> RouteDecision {
    match outcome {
        Ok(page) => RouteDecision::UseResult(page),
        Err(e) if intent == Intent::Search && e.class() == FailureClass::PermissionRestricted => {
            RouteDecision::Retry
        }
        Err(e) => RouteDecision::Propagate(e),
    }
}

/// Parameters the replacement aggregation runs with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackQuery {
    /// `None` means every known region.
    pub regions: Option<Vec<String>>,
    pub category: Option<String>,
    pub term: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Clone)]
pub struct FallbackRouter {
    engine: AggregationEngine,
    known_regions: Vec<String>,
}

impl FallbackRouter {
    pub fn new(engine: AggregationEngine, known_regions: Vec<String>) -> Self {
        Self {
            engine,
            known_regions,
        }
    }

    /// Apply `route` and carry out a retry if one is called for.
    pub async fn resolve(
        &self,
        intent: Intent,
        outcome: UpstreamOutcome,
        query: FallbackQuery,
    ) -> Result<ArticlePage, QueryError> {
        let status = outcome.as_ref().err().and_then(UpstreamError::status);
        match route(intent, outcome) {
            RouteDecision::UseResult(page) => Ok(page),
            RouteDecision::Propagate(source) => Err(QueryError::Upstream { intent, source }),
            RouteDecision::Retry => {
                info!(
                    intent = intent.as_str(),
                    upstream_status = status,
                    "search not permitted upstream; substituting headline aggregation"
                );
                counter!("fallback_substitutions_total", "intent" => intent.as_str()).increment(1);

                let req = AggregateRequest {
                    regions: query
                        .regions
                        .filter(|r| !r.is_empty())
                        .unwrap_or_else(|| self.known_regions.clone()),
                    category: query.category,
                    term: query.term,
                    page: query.page,
                    page_size: query.page_size,
                };
                let result = self
                    .engine
                    .aggregate(&req)
                    .await
                    .map_err(|source| QueryError::Aggregate { intent, source })?;

                if result.is_total_failure() {
                    if let Some((region, source)) = result.first_failure {
                        warn!(
                            intent = intent.as_str(),
                            region = %region,
                            error = %source,
                            "replacement aggregation failed in every region"
                        );
                        return Err(QueryError::Upstream { intent, source });
                    }
                }
                Ok(result.into())
            }
        }
    }
}
