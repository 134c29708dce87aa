// tests/common/scripted.rs
//
// Deterministic in-process upstream. Responses are scripted per endpoint and
// (optionally) per country; every call is recorded so tests can assert on the
// exact fan-out.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use headline_relay::article::ArticlePage;
use headline_relay::error::UpstreamError;
use headline_relay::upstream::{Endpoint, UpstreamClient, UpstreamOutcome, UpstreamQuery};

#[derive(Debug, Clone)]
struct Script {
    outcome: UpstreamOutcome,
    delay: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub query: UpstreamQuery,
    pub timeout: Duration,
}

#[derive(Default)]
pub struct ScriptedClient {
    // key: (endpoint, country); `None` country is the endpoint-wide default
    scripts: HashMap<(Endpoint, Option<String>), Script>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default outcome for every call to `endpoint`.
    pub fn on(mut self, endpoint: Endpoint, outcome: UpstreamOutcome) -> Self {
        self.scripts.insert(
            (endpoint, None),
            Script {
                outcome,
                delay: None,
            },
        );
        self
    }

    /// Outcome for a specific country on `endpoint`.
    pub fn on_country(mut self, endpoint: Endpoint, country: &str, outcome: UpstreamOutcome) -> Self {
        self.scripts.insert(
            (endpoint, Some(country.to_string())),
            Script {
                outcome,
                delay: None,
            },
        );
        self
    }

    /// Delay the scripted answer for `country` (used for timeout tests).
    pub fn delay_country(mut self, endpoint: Endpoint, country: &str, delay: Duration) -> Self {
        let key = (endpoint, Some(country.to_string()));
        let fallback = self
            .scripts
            .get(&(endpoint, None))
            .map(|s| s.outcome.clone())
            .unwrap_or_else(|| Ok(ArticlePage::empty()));
        self.scripts
            .entry(key)
            .or_insert(Script {
                outcome: fallback,
                delay: None,
            })
            .delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        match self.calls.lock() {
            Ok(g) => g.clone(),
            Err(poison) => poison.into_inner().clone(),
        }
    }

    fn script_for(&self, endpoint: Endpoint, query: &UpstreamQuery) -> Option<Script> {
        query
            .country
            .as_ref()
            .and_then(|c| self.scripts.get(&(endpoint, Some(c.clone()))))
            .or_else(|| self.scripts.get(&(endpoint, None)))
            .cloned()
    }
}

#[async_trait]
impl UpstreamClient for ScriptedClient {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        query: &UpstreamQuery,
        timeout: Duration,
    ) -> UpstreamOutcome {
        {
            let mut calls = match self.calls.lock() {
                Ok(g) => g,
                Err(poison) => poison.into_inner(),
            };
            calls.push(RecordedCall {
                endpoint,
                query: query.clone(),
                timeout,
            });
        }

        let Some(script) = self.script_for(endpoint, query) else {
            return Err(UpstreamError::Status {
                status: 404,
                message: format!("no script for {}", endpoint.path()),
            });
        };
        if let Some(d) = script.delay {
            tokio::time::sleep(d).await;
        }
        script.outcome
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
