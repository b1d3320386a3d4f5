//! Wire types for the code-analysis backend.
//!
//! Every field the backend may omit is an `Option`. The UI never trusts the
//! shape of a status payload, so display fallbacks live here next to the
//! types rather than being scattered across render code.

use serde::{Deserialize, Serialize};

/// Treats a missing or empty string as absent, mirroring how the status
/// panel falls back to placeholder labels.
fn label_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(fallback)
}

// ============================================================================
// GET /api/health/
// ============================================================================

/// Point-in-time health reading. Replaced wholesale on every poll.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HealthSnapshot {
    pub status: Option<String>,
    pub services: Option<Services>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Services {
    pub api: Option<String>,
    pub ollama: Option<String>,
    pub github: Option<String>,
    pub details: Option<ServiceDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ServiceDetails {
    pub ollama: Option<OllamaDetails>,
    pub github: Option<GithubDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OllamaDetails {
    #[serde(default)]
    pub models: Vec<OllamaModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OllamaModel {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GithubDetails {
    pub user: Option<String>,
}

impl HealthSnapshot {
    fn details(&self) -> Option<&ServiceDetails> {
        self.services.as_ref()?.details.as_ref()
    }

    pub fn status_label(&self) -> &str {
        label_or(self.status.as_deref(), "unknown")
    }

    pub fn api_label(&self) -> &str {
        label_or(
            self.services.as_ref().and_then(|s| s.api.as_deref()),
            "offline",
        )
    }

    pub fn ollama_label(&self) -> &str {
        label_or(
            self.services.as_ref().and_then(|s| s.ollama.as_deref()),
            "offline",
        )
    }

    /// Name of the first model the runtime reports.
    pub fn model_label(&self) -> &str {
        label_or(
            self.details()
                .and_then(|d| d.ollama.as_ref())
                .and_then(|o| o.models.first())
                .and_then(|m| m.name.as_deref()),
            "N/A",
        )
    }

    pub fn github_label(&self) -> &str {
        label_or(
            self.services.as_ref().and_then(|s| s.github.as_deref()),
            "not authenticated",
        )
    }

    pub fn user_label(&self) -> &str {
        label_or(
            self.details()
                .and_then(|d| d.github.as_ref())
                .and_then(|g| g.user.as_deref()),
            "N/A",
        )
    }
}

// ============================================================================
// GET /api/cache/stats/
// ============================================================================

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Cached repository clones on the backend.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CacheSnapshot {
    pub cache: Option<CacheStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_repos: Option<u64>,
    /// Bytes.
    pub total_size: Option<u64>,
}

impl CacheSnapshot {
    pub fn total_repos(&self) -> u64 {
        self.cache.as_ref().and_then(|c| c.total_repos).unwrap_or(0)
    }

    /// Size in megabytes with two decimals, or `"0"` when nothing is cached.
    pub fn size_mb_label(&self) -> String {
        match self.cache.as_ref().and_then(|c| c.total_size) {
            Some(bytes) if bytes > 0 => format!("{:.2}", bytes as f64 / BYTES_PER_MB),
            _ => "0".to_string(),
        }
    }
}

// ============================================================================
// POST /api/query
// ============================================================================

/// Request body for a repository question.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<'a> {
    pub repo_url: &'a str,
    pub query: &'a str,
}

/// Successful answer. `response` may be absent on a sloppy backend; the chat
/// entry then resolves with no reply text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResponse {
    pub response: Option<String>,
    pub metadata: Option<AiStats>,
}

/// Metadata describing the backend's most recent query execution.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStats {
    pub files_analyzed: Option<u64>,
    pub total_files: Option<u64>,
    pub tokens_used: Option<u64>,
    pub repository: Option<String>,
}

impl AiStats {
    pub fn repository_label(&self) -> &str {
        label_or(self.repository.as_deref(), "N/A")
    }
}

// ============================================================================
// Error / acknowledgement bodies
// ============================================================================

/// Shape shared by error responses and the cache-clear acknowledgement.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageBody {
    pub message: Option<String>,
    pub error: Option<String>,
}
