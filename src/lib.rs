// src/lib.rs
// Public library surface for integration tests (and the binary).

pub mod aggregate;
pub mod api;
pub mod article;
pub mod config;
pub mod error;
pub mod fallback;
pub mod merge;
pub mod metrics;
pub mod paginate;
pub mod service;
pub mod telemetry;
pub mod upstream;

use std::sync::Arc;

pub use crate::api::router;
pub use crate::config::AppConfig;
pub use crate::service::QueryService;

use crate::upstream::newsapi::NewsApiClient;

/// Build the full HTTP app against the real NewsAPI client.
pub fn app(config: AppConfig) -> anyhow::Result<axum::Router> {
    let config = Arc::new(config);
    let client = NewsApiClient::from_config(&config)?;
    let service = QueryService::new(config, Arc::new(client));
    Ok(router(service))
}
