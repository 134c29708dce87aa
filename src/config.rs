// src/config.rs
//! Process configuration, resolved once at startup and shared by reference.
//!
//! Values come from the environment (optionally seeded from `.env` via
//! `dotenvy` in the binary). A missing `NEWS_API_KEY` is not a startup error:
//! the server still boots and every news request answers with a
//! "not configured" error instead of calling upstream.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

// --- env names ---
pub const ENV_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "HOST";
pub const ENV_BASE_URL: &str = "NEWS_API_BASE_URL";
pub const ENV_DEFAULT_COUNTRY: &str = "DEFAULT_COUNTRY";
pub const ENV_UPSTREAM_TIMEOUT_MS: &str = "UPSTREAM_TIMEOUT_MS";
pub const ENV_AGGREGATE_TIMEOUT_MS: &str = "AGGREGATE_TIMEOUT_MS";
pub const ENV_STATIC_DIR: &str = "STATIC_DIR";

// --- defaults ---
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_AGGREGATE_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Editions queried when a caller asks for `country=all`.
pub const ALL_REGIONS: [&str; 12] = [
    "us", "gb", "in", "au", "ca", "de", "fr", "it", "jp", "ru", "sa", "za",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` when unset or blank.
    pub api_key: Option<String>,
    pub bind: SocketAddr,
    pub base_url: String,
    pub default_country: String,
    /// Timeout for a single direct upstream call.
    pub upstream_timeout: Duration,
    /// Timeout applied to each region call of a fan-out.
    pub aggregate_timeout: Duration,
    pub static_dir: PathBuf,
    pub regions: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_country: DEFAULT_COUNTRY.to_string(),
            upstream_timeout: Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
            aggregate_timeout: Duration::from_millis(DEFAULT_AGGREGATE_TIMEOUT_MS),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            regions: ALL_REGIONS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset. Malformed numbers are errors, so a
    /// typo in `PORT` fails startup instead of silently binding elsewhere.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut cfg = Self::default();

        cfg.api_key = get(ENV_API_KEY);

        let port = match get(ENV_PORT) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("{ENV_PORT} must be a port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };
        let host = match get(ENV_HOST) {
            Some(raw) => raw
                .parse::<IpAddr>()
                .with_context(|| format!("{ENV_HOST} must be an IP address, got '{raw}'"))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        cfg.bind = SocketAddr::new(host, port);

        if let Some(url) = get(ENV_BASE_URL) {
            cfg.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(country) = get(ENV_DEFAULT_COUNTRY) {
            cfg.default_country = country.to_ascii_lowercase();
        }
        if let Some(ms) = parse_millis(get(ENV_UPSTREAM_TIMEOUT_MS), ENV_UPSTREAM_TIMEOUT_MS)? {
            cfg.upstream_timeout = ms;
        }
        if let Some(ms) = parse_millis(get(ENV_AGGREGATE_TIMEOUT_MS), ENV_AGGREGATE_TIMEOUT_MS)? {
            cfg.aggregate_timeout = ms;
        }
        if let Some(dir) = get(ENV_STATIC_DIR) {
            cfg.static_dir = PathBuf::from(dir);
        }

        Ok(cfg)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Builder-style helper mostly used by tests and embedders.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

fn parse_millis(raw: Option<String>, name: &str) -> Result<Option<Duration>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let ms = raw
        .parse::<u64>()
        .with_context(|| format!("{name} must be milliseconds, got '{raw}'"))?;
    // zero would make every call time out immediately
    Ok(Some(Duration::from_millis(ms.max(1))))
}
