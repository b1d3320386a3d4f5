//! # Actions
//!
//! Everything that can happen in CodeLens becomes an `Action`.
//! User presses Enter in the query box? That's `Action::SubmitQuery(text)`.
//! Backend answers? That's `Action::QueryFinished { .. }`.
//!
//! `update()` applies an action to the state and returns an `Effect`: the
//! I/O the caller must perform next. No network or disk access happens here.
//!
//! ```text
//! State + Action  →  update()  →  (New State, Effect)
//! ```

use std::time::Instant;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::api::{BackendError, CacheClearOutcome, CacheSnapshot, HealthSnapshot, QueryResponse};
use crate::core::chat::Resolution;
use crate::core::state::{App, Notice};

pub const QUERY_FAILED_ERROR: &str = "Failed to get response from API";
pub const QUERY_NETWORK_ERROR: &str = "Network error: Failed to connect to API";
pub const POLL_ERROR: &str = "Failed to fetch data from API";
pub const CACHE_CLEARED: &str = "Cache cleared successfully";
pub const CACHE_CLEAR_NETWORK_ERROR: &str = "Network error while clearing cache";

#[derive(Debug)]
pub enum Action {
    Quit,
    /// Repository field edited.
    RepoUrlChanged(String),
    /// Query box submitted with this (untrimmed) text.
    SubmitQuery(String),
    QueryFinished {
        entry_id: Uuid,
        result: Result<QueryResponse, BackendError>,
    },
    /// A status poll settled. `initial` marks the loader-gated first poll.
    StatusPolled {
        initial: bool,
        result: Result<(HealthSnapshot, CacheSnapshot), BackendError>,
    },
    RequestClearCache,
    ConfirmClearCache,
    CancelClearCache,
    CacheCleared(CacheClearOutcome),
    DismissNotice,
}

/// I/O requested by `update()`.
#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    Quit,
    /// Send the query and persist the new pending entry.
    SpawnQuery {
        entry_id: Uuid,
        repo_url: String,
        query: String,
    },
    SpawnClearCache,
    SaveSession,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Quit => Effect::Quit,

        Action::RepoUrlChanged(text) => {
            if app.show_repo_warning && !text.trim().is_empty() {
                app.show_repo_warning = false;
            }
            app.repo_url = text;
            Effect::None
        }

        Action::SubmitQuery(text) => {
            let repo_url = app.repo_url.trim();
            if repo_url.is_empty() {
                app.show_repo_warning = true;
                return Effect::None;
            }

            let query = text.trim();
            if query.is_empty() {
                return Effect::None;
            }

            if app.is_querying {
                debug!("Submit ignored: a query is already in flight");
                return Effect::None;
            }

            let repo_url = repo_url.to_string();
            let query = query.to_string();

            app.show_repo_warning = false;
            let entry_id = app.chat.push_pending(query.clone());
            app.is_querying = true;
            app.placeholder.start(Instant::now());

            info!("Query submitted (entry={}, repo={})", entry_id, repo_url);
            Effect::SpawnQuery {
                entry_id,
                repo_url,
                query,
            }
        }

        Action::QueryFinished { entry_id, result } => {
            let resolution = match result {
                Ok(body) => {
                    if let Some(metadata) = body.metadata {
                        app.ai_stats = Some(metadata);
                    }
                    Resolution::Answered(body.response)
                }
                Err(BackendError::Api { status, message }) => {
                    warn!("Query failed with HTTP {} (entry={})", status, entry_id);
                    Resolution::Failed(message.unwrap_or_else(|| QUERY_FAILED_ERROR.to_string()))
                }
                Err(e) => {
                    warn!("Query failed (entry={}): {}", entry_id, e);
                    Resolution::Failed(QUERY_NETWORK_ERROR.to_string())
                }
            };

            if !app.chat.resolve(entry_id, resolution) {
                warn!("Query result for evicted entry {} dropped", entry_id);
            }
            app.is_querying = false;
            app.placeholder.stop();
            Effect::SaveSession
        }

        Action::StatusPolled { initial, result } => {
            match result {
                Ok((health, cache)) => {
                    debug!("Status poll ok (initial={})", initial);
                    app.health = Some(health);
                    app.cache = Some(cache);
                    app.page_error = None;
                }
                Err(e) => {
                    warn!("Status poll failed (initial={}): {}", initial, e);
                    app.page_error = Some(POLL_ERROR.to_string());
                }
            }
            if initial {
                app.is_loading = false;
            }
            Effect::None
        }

        Action::RequestClearCache => {
            if app.page_error.is_some() {
                debug!("Ignoring cache clear request while the backend is unreachable");
                return Effect::None;
            }
            app.confirm_clear_cache = true;
            Effect::None
        }

        Action::CancelClearCache => {
            app.confirm_clear_cache = false;
            Effect::None
        }

        Action::ConfirmClearCache => {
            if !app.confirm_clear_cache {
                return Effect::None;
            }
            app.confirm_clear_cache = false;
            Effect::SpawnClearCache
        }

        Action::CacheCleared(outcome) => {
            app.notice = Some(match outcome {
                CacheClearOutcome::Cleared { message, refreshed } => {
                    match refreshed {
                        Ok(cache) => app.cache = Some(cache),
                        Err(e) => warn!("Cache stats refresh after clear failed: {}", e),
                    }
                    Notice::info(message.unwrap_or_else(|| CACHE_CLEARED.to_string()))
                }
                CacheClearOutcome::Failed(BackendError::Api { message, .. }) => Notice::error(
                    format!(
                        "Failed to clear cache: {}",
                        message.as_deref().unwrap_or("Unknown error")
                    ),
                ),
                CacheClearOutcome::Failed(e) => {
                    warn!("Cache clear failed: {}", e);
                    Notice::error(CACHE_CLEAR_NETWORK_ERROR)
                }
            });
            Effect::None
        }

        Action::DismissNotice => {
            app.notice = None;
            Effect::None
        }
    }
}
