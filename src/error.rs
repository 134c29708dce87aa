// src/error.rs
//! Error taxonomy for the request path.
//!
//! Upstream failures are classified once, here, so the fallback policy can
//! branch on a closed set instead of inspecting status codes ad hoc.

use std::time::Duration;

use thiserror::Error;

/// Upstream statuses meaning "your plan does not allow this query type".
pub const PERMISSION_STATUSES: [u16; 3] = [401, 403, 426];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Timeout, network error, 5xx or anything else not tied to the plan.
    Transient,
    /// 401/403/426: the query type is not allowed for this key.
    PermissionRestricted,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("upstream returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("upstream payload could not be decoded: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// HTTP status reported by upstream, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn class(&self) -> FailureClass {
        match self.status() {
            Some(s) if PERMISSION_STATUSES.contains(&s) => FailureClass::PermissionRestricted,
            _ => FailureClass::Transient,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::Status {
                status: status.as_u16(),
                message: e.to_string(),
            };
        }
        if e.is_decode() {
            return Self::Decode(e.to_string());
        }
        Self::Transport(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("region task for '{region}' did not complete: {message}")]
    Task { region: String, message: String },
}

/// Which public operation a request was serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Curated headline browse (`/api/top-headlines`).
    Headlines,
    /// Free-text search (`/api/everything`).
    Search,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Headlines => "headlines",
            Intent::Search => "search",
        }
    }

    /// Client-facing message when the intent fails end-to-end.
    pub fn failure_message(self) -> &'static str {
        match self {
            Intent::Headlines => "Failed to fetch top headlines",
            Intent::Search => "Failed to fetch articles",
        }
    }
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Missing {0} in environment")]
    NotConfigured(&'static str),

    #[error("{} request failed: {source}", .intent.as_str())]
    Upstream {
        intent: Intent,
        #[source]
        source: UpstreamError,
    },

    #[error("{} aggregation failed: {source}", .intent.as_str())]
    Aggregate {
        intent: Intent,
        #[source]
        source: AggregateError,
    },
}

impl QueryError {
    /// HTTP status to surface; 500 when the failure carried none.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotConfigured(_) => 500,
            Self::Upstream { source, .. } => source.status().unwrap_or(500),
            Self::Aggregate { .. } => 500,
        }
    }

    /// Body text for the `{ "error": ... }` response.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotConfigured(_) => self.to_string(),
            Self::Upstream { intent, .. } | Self::Aggregate { intent, .. } => {
                intent.failure_message().to_string()
            }
        }
    }
}
