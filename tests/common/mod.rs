// tests/common/mod.rs
//
// Shared fixtures for integration tests: article builders and a service
// wired to the scripted upstream.
#![allow(dead_code)]

pub mod scripted;

use std::sync::Arc;

use headline_relay::article::{Article, ArticlePage, ArticleSource};
use headline_relay::config::AppConfig;
use headline_relay::error::UpstreamError;
use headline_relay::service::QueryService;
use headline_relay::upstream::UpstreamOutcome;

use scripted::ScriptedClient;

pub fn article(url: &str, published_at: &str) -> Article {
    Article {
        source: ArticleSource {
            id: None,
            name: Some("Test Wire".into()),
        },
        title: Some(format!("title for {url}")),
        url: Some(url.to_string()),
        published_at: Some(published_at.to_string()),
        ..Default::default()
    }
}

/// `n` articles for `region`, one hour apart, newest first, offset by `day`.
pub fn region_articles(region: &str, n: usize, day: u32) -> Vec<Article> {
    (0..n)
        .map(|i| {
            article(
                &format!("https://{region}.example/{i}"),
                &format!("2024-05-{:02}T{:02}:00:00Z", day, 23 - i),
            )
        })
        .collect()
}

pub fn ok(articles: Vec<Article>) -> UpstreamOutcome {
    Ok(ArticlePage::ok(articles.len() as u64, articles))
}

pub fn fail(status: u16) -> UpstreamOutcome {
    Err(UpstreamError::Status {
        status,
        message: format!("scripted {status}"),
    })
}

pub fn configured() -> AppConfig {
    AppConfig::default().with_api_key("test-key")
}

pub fn service(config: AppConfig, client: ScriptedClient) -> (Arc<ScriptedClient>, QueryService) {
    let client = Arc::new(client);
    let svc = QueryService::new(Arc::new(config), client.clone());
    (client, svc)
}
