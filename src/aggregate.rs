// src/aggregate.rs
//! # Aggregation Engine
//! Fans one logical headline request out to every requested region, waits for
//! all of them, and folds the results through the merger and paginator.
//!
//! A region that fails or times out contributes zero articles; it is logged
//! and counted but never fails the whole request. Callers are not told that a
//! page is degraded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use metrics::{counter, histogram};
use tracing::{debug, warn};

use crate::article::{Article, ArticlePage};
use crate::error::{AggregateError, UpstreamError};
use crate::merge::merge;
use crate::paginate::paginate;
use crate::upstream::{Endpoint, UpstreamClient, UpstreamQuery};

/// Total page size the per-region share is carved from.
pub const REFERENCE_PAGE_SIZE: u32 = 20;
/// No region is asked for fewer articles than this.
pub const MIN_REGION_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRequest {
    pub regions: Vec<String>,
    pub category: Option<String>,
    pub term: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

/// Deduplicated total plus the requested page.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult {
    pub total_results: usize,
    pub articles: Vec<Article>,
    pub queried_regions: usize,
    pub failed_regions: usize,
    /// First failure in region order, if any region failed.
    pub first_failure: Option<(String, UpstreamError)>,
}

impl AggregatedResult {
    /// Every queried region failed, so the empty page says nothing about upstream content.
    pub fn is_total_failure(&self) -> bool {
        self.queried_regions > 0 && self.failed_regions == self.queried_regions
    }
}

impl From<AggregatedResult> for ArticlePage {
    fn from(r: AggregatedResult) -> Self {
        ArticlePage::ok(r.total_results as u64, r.articles)
    }
}

/// `max(5, floor(20 / regions))`.
pub fn region_page_size(region_count: usize) -> u32 {
    if region_count == 0 {
        return REFERENCE_PAGE_SIZE;
    }
    let share = REFERENCE_PAGE_SIZE as usize / region_count;
    (share as u32).max(MIN_REGION_PAGE_SIZE)
}

#[derive(Clone)]
pub struct AggregationEngine {
    client: Arc<dyn UpstreamClient>,
    call_timeout: Duration,
}

impl AggregationEngine {
    pub fn new(client: Arc<dyn UpstreamClient>, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
        }
    }

    pub async fn aggregate(&self, req: &AggregateRequest) -> Result<AggregatedResult, AggregateError> {
        let t0 = Instant::now();
        let per_region = region_page_size(req.regions.len());

        let handles = req.regions.iter().map(|region| {
            let client = Arc::clone(&self.client);
            let timeout = self.call_timeout;
            let query = UpstreamQuery::region(
                region,
                req.category.as_deref(),
                req.term.as_deref(),
                per_region,
            );
            tokio::spawn(async move {
                // per-call budget, independent of the client's own timeout
                match tokio::time::timeout(
                    timeout,
                    client.fetch(Endpoint::TopHeadlines, &query, timeout),
                )
                .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(UpstreamError::Timeout(timeout)),
                }
            })
        });

        // join_all keeps region order, so the merge sees batches in a fixed order
        let joined = join_all(handles).await;

        let mut batches = Vec::with_capacity(joined.len());
        let mut failed_regions = 0;
        let mut first_failure = None;
        for (region, res) in req.regions.iter().zip(joined) {
            match res {
                Ok(Ok(page)) => batches.push(page.articles),
                Ok(Err(e)) => {
                    warn!(
                        region = %region,
                        upstream = self.client.name(),
                        error = %e,
                        "region fetch failed; continuing without it"
                    );
                    counter!("aggregate_region_failures_total", "region" => region.clone())
                        .increment(1);
                    failed_regions += 1;
                    first_failure.get_or_insert_with(|| (region.clone(), e));
                    batches.push(Vec::new());
                }
                Err(join_err) => {
                    return Err(AggregateError::Task {
                        region: region.clone(),
                        message: join_err.to_string(),
                    });
                }
            }
        }

        let raw: usize = batches.iter().map(Vec::len).sum();
        let merged = merge(batches);
        let page = paginate(merged, req.page, req.page_size);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("aggregate_duration_ms").record(ms);
        debug!(
            regions = req.regions.len(),
            per_region,
            raw,
            failed_regions,
            unique = page.total_results,
            returned = page.slice.len(),
            elapsed_ms = ms as u64,
            "aggregation complete"
        );

        Ok(AggregatedResult {
            total_results: page.total_results,
            articles: page.slice,
            queried_regions: req.regions.len(),
            failed_regions,
            first_failure,
        })
    }
}
