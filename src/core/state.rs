//! # Application State
//!
//! Core session state for CodeLens. Domain data only; presentation state
//! (input buffers, scroll offsets, fade timers) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn Backend>      // code-analysis service
//! ├── chat: ChatHistory              // session transcript
//! ├── health: Option<HealthSnapshot> // last successful poll
//! ├── cache: Option<CacheSnapshot>   // last successful poll / clear
//! ├── ai_stats: Option<AiStats>      // metadata of the last answered query
//! ├── page_error: Option<String>     // poll failure banner
//! ├── is_loading: bool               // initial fetch, loader shown
//! ├── is_querying: bool              // a query is in flight
//! ├── repo_url: String               // repository field contents
//! ├── show_repo_warning: bool        // submit attempted without a repo
//! ├── placeholder: Rotation          // pending-reply status lines
//! ├── confirm_clear_cache: bool      // confirmation overlay open
//! └── notice: Option<Notice>         // acknowledgement / failure popup
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;
use std::time::Instant;

use crate::api::{AiStats, Backend, CacheSnapshot, HealthSnapshot};
use crate::core::chat::{ChatEntry, ChatHistory};
use crate::core::rotation::{PLACEHOLDER_MESSAGES, Rotation};

/// Error recorded on entries that were still waiting when the previous run exited.
pub const INTERRUPTED_QUERY_ERROR: &str = "Interrupted before a response arrived";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// One-shot message for the user, dismissed by the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

pub struct App {
    pub backend: Arc<dyn Backend>,
    pub chat: ChatHistory,
    pub health: Option<HealthSnapshot>,
    pub cache: Option<CacheSnapshot>,
    pub ai_stats: Option<AiStats>,
    pub page_error: Option<String>,
    /// True until the first status poll settles (success or failure).
    pub is_loading: bool,
    pub is_querying: bool,
    pub repo_url: String,
    pub show_repo_warning: bool,
    pub placeholder: Rotation,
    pub confirm_clear_cache: bool,
    pub notice: Option<Notice>,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, max_history: usize) -> Self {
        Self {
            backend,
            chat: ChatHistory::new(max_history),
            health: None,
            cache: None,
            ai_stats: None,
            page_error: None,
            is_loading: true,
            is_querying: false,
            repo_url: String::new(),
            show_repo_warning: false,
            placeholder: Rotation::placeholder(),
            confirm_clear_cache: false,
            notice: None,
        }
    }

    /// Replace the transcript with entries restored from the session store.
    /// Entries left loading by a previous run can never be answered, so they
    /// are failed here.
    pub fn restore_history(&mut self, entries: Vec<ChatEntry>) {
        let max = self.chat.max_entries();
        self.chat = ChatHistory::from_entries(entries, max);
        let interrupted = self.chat.interrupt_stale(INTERRUPTED_QUERY_ERROR);
        if interrupted > 0 {
            log::warn!("Restored {} interrupted chat entries", interrupted);
        }
    }

    /// Status line for the pending reply bubble at `now`.
    pub fn placeholder_text(&self, now: Instant) -> &'static str {
        PLACEHOLDER_MESSAGES[self.placeholder.index_at(now)]
    }
}
