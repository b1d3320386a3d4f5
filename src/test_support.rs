//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{Backend, BackendError, CacheSnapshot, HealthSnapshot, QueryResponse};

/// A backend that answers every call immediately with an empty success.
pub struct NoopBackend;

#[async_trait]
impl Backend for NoopBackend {
    fn base_url(&self) -> &str {
        "noop"
    }

    async fn health(&self) -> Result<HealthSnapshot, BackendError> {
        Ok(HealthSnapshot::default())
    }

    async fn cache_stats(&self) -> Result<CacheSnapshot, BackendError> {
        Ok(CacheSnapshot::default())
    }

    async fn clear_cache(&self) -> Result<Option<String>, BackendError> {
        Ok(None)
    }

    async fn query(&self, _repo_url: &str, _query: &str) -> Result<QueryResponse, BackendError> {
        Ok(QueryResponse::default())
    }
}

/// A backend whose every call fails at the transport level.
pub struct UnreachableBackend;

#[async_trait]
impl Backend for UnreachableBackend {
    fn base_url(&self) -> &str {
        "unreachable"
    }

    async fn health(&self) -> Result<HealthSnapshot, BackendError> {
        Err(BackendError::Network("connection refused".to_string()))
    }

    async fn cache_stats(&self) -> Result<CacheSnapshot, BackendError> {
        Err(BackendError::Network("connection refused".to_string()))
    }

    async fn clear_cache(&self) -> Result<Option<String>, BackendError> {
        Err(BackendError::Network("connection refused".to_string()))
    }

    async fn query(&self, _repo_url: &str, _query: &str) -> Result<QueryResponse, BackendError> {
        Err(BackendError::Network("connection refused".to_string()))
    }
}

/// Creates a test App with a NoopBackend.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new(Arc::new(NoopBackend), crate::core::chat::DEFAULT_MAX_HISTORY)
}
