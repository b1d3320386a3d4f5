use std::fmt;

use async_trait::async_trait;

use super::types::{CacheSnapshot, HealthSnapshot, QueryResponse};

/// Errors from talking to the code-analysis backend.
#[derive(Debug)]
pub enum BackendError {
    /// Transport failure (connection refused, DNS, reset). Retryable.
    Network(String),
    /// Backend answered with a non-2xx status. `message` is the body's `error`
    /// field when the backend supplied one.
    Api { status: u16, message: Option<String> },
    /// A 2xx body that isn't the JSON we expect.
    Parse(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api {
                status,
                message: Some(message),
            } => write!(f, "API error (HTTP {status}): {message}"),
            BackendError::Api {
                status,
                message: None,
            } => write!(f, "API error (HTTP {status})"),
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// The HTTP surface of the code-analysis backend.
///
/// The TUI only ever holds an `Arc<dyn Backend>`, so tests can swap in a
/// canned implementation without a server.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Base address requests are sent to (for logging and the status panel).
    fn base_url(&self) -> &str;

    /// `GET /api/health/`
    async fn health(&self) -> Result<HealthSnapshot, BackendError>;

    /// `GET /api/cache/stats/`
    async fn cache_stats(&self) -> Result<CacheSnapshot, BackendError>;

    /// `DELETE /api/cache`. Returns the acknowledgement message, if any.
    async fn clear_cache(&self) -> Result<Option<String>, BackendError>;

    /// `POST /api/query`
    async fn query(&self, repo_url: &str, query: &str) -> Result<QueryResponse, BackendError>;
}

/// Fetch health and cache stats together. Both must succeed; either failure
/// fails the whole reading so the panel never mixes fresh and stale halves.
pub async fn fetch_status(
    backend: &dyn Backend,
) -> Result<(HealthSnapshot, CacheSnapshot), BackendError> {
    futures::try_join!(backend.health(), backend.cache_stats())
}

/// Result of a confirmed cache clear.
#[derive(Debug)]
pub enum CacheClearOutcome {
    /// The backend accepted the clear. `refreshed` is the follow-up stats read.
    Cleared {
        message: Option<String>,
        refreshed: Result<CacheSnapshot, BackendError>,
    },
    /// The clear itself failed.
    Failed(BackendError),
}

/// Clear the backend cache, then re-read the stats on success.
pub async fn clear_and_refresh(backend: &dyn Backend) -> CacheClearOutcome {
    match backend.clear_cache().await {
        Ok(message) => CacheClearOutcome::Cleared {
            message,
            refreshed: backend.cache_stats().await,
        },
        Err(e) => CacheClearOutcome::Failed(e),
    }
}
