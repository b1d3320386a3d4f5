//! reqwest implementation of [`Backend`].

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;

use super::backend::{Backend, BackendError};
use super::types::{CacheSnapshot, HealthSnapshot, MessageBody, QueryRequest, QueryResponse};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// HTTP client for the code-analysis backend.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a response into `T`, or into `BackendError::Api` carrying the
/// body's `error` field for non-2xx statuses.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| BackendError::Network(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_slice::<MessageBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty());
        warn!(
            "Backend error: HTTP {} ({} bytes, message={:?})",
            status.as_u16(),
            body.len(),
            message
        );
        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
        });
    }

    debug!("Backend response: HTTP {} ({} bytes)", status.as_u16(), body.len());
    serde_json::from_slice(&body).map_err(|e| BackendError::Parse(e.to_string()))
}

/// Status endpoints report degraded services with a non-2xx status and a
/// normal body, so any JSON body is accepted. Only an unreadable body fails:
/// `Api` for non-2xx, `Parse` for 2xx.
async fn read_status_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| BackendError::Network(e.to_string()))?;

    match serde_json::from_slice(&body) {
        Ok(value) => {
            if !status.is_success() {
                warn!("Status endpoint answered HTTP {} with a readable body", status.as_u16());
            }
            Ok(value)
        }
        Err(e) if status.is_success() => Err(BackendError::Parse(e.to_string())),
        Err(_) => {
            warn!(
                "Status endpoint error: HTTP {} ({} bytes, unreadable)",
                status.as_u16(),
                body.len()
            );
            Err(BackendError::Api {
                status: status.as_u16(),
                message: None,
            })
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn health(&self) -> Result<HealthSnapshot, BackendError> {
        let response = self
            .client
            .get(self.url("/api/health/"))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        read_status_json(response).await
    }

    async fn cache_stats(&self) -> Result<CacheSnapshot, BackendError> {
        let response = self
            .client
            .get(self.url("/api/cache/stats/"))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        read_status_json(response).await
    }

    async fn clear_cache(&self) -> Result<Option<String>, BackendError> {
        info!("Clearing backend cache at {}", self.base_url);
        let response = self
            .client
            .delete(self.url("/api/cache"))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let body: MessageBody = read_json(response).await?;
        Ok(body.message.filter(|m| !m.is_empty()))
    }

    async fn query(&self, repo_url: &str, query: &str) -> Result<QueryResponse, BackendError> {
        info!(
            "Query request: repo={}, query_len={}",
            repo_url,
            query.len()
        );
        let response = self
            .client
            .post(self.url("/api/query"))
            .json(&QueryRequest { repo_url, query })
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        read_json(response).await
    }
}
