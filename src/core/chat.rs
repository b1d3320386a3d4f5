//! # Chat History
//!
//! The session transcript: one `ChatEntry` per submitted question.
//!
//! Entries are append-only and addressed by a UUID assigned at creation, so a
//! reply always lands on the entry that asked for it even if more entries were
//! appended in between. The history is capped; appending past the cap evicts
//! the oldest entries first.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_MAX_HISTORY: usize = 500;

/// One round-trip: the user's question and the eventual reply or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub query: String,
    pub response: Option<String>,
    pub error: Option<String>,
    #[serde(default)]
    pub is_loading: bool,
}

impl ChatEntry {
    pub fn pending(query: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            query,
            response: None,
            error: None,
            is_loading: true,
        }
    }
}

/// How an in-flight entry ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Backend answered. The reply text may be absent.
    Answered(Option<String>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ChatHistory {
    entries: Vec<ChatEntry>,
    max_entries: usize,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl ChatHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Rebuild a history from persisted entries, applying the cap.
    pub fn from_entries(entries: Vec<ChatEntry>, max_entries: usize) -> Self {
        let mut history = Self {
            entries,
            max_entries: max_entries.max(1),
        };
        history.evict_overflow();
        history
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn get(&self, id: Uuid) -> Option<&ChatEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The entry currently waiting on the backend, if any.
    pub fn in_flight(&self) -> Option<&ChatEntry> {
        self.entries.iter().rev().find(|e| e.is_loading)
    }

    /// Append a loading entry for `query` and return its id.
    pub fn push_pending(&mut self, query: String) -> Uuid {
        let entry = ChatEntry::pending(query);
        let id = entry.id;
        self.entries.push(entry);
        self.evict_overflow();
        id
    }

    /// Settle the entry with `id`. Returns `false` if it is no longer in the
    /// history (evicted or cleared).
    pub fn resolve(&mut self, id: Uuid, resolution: Resolution) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };

        match resolution {
            Resolution::Answered(response) => {
                entry.response = response;
                entry.error = None;
            }
            Resolution::Failed(error) => {
                entry.response = None;
                entry.error = Some(error);
            }
        }
        entry.is_loading = false;
        true
    }

    /// Fail every entry still marked loading. Used on restore, where nothing
    /// can answer a request made by a previous run. Returns how many changed.
    pub fn interrupt_stale(&mut self, message: &str) -> usize {
        let mut count = 0;
        for entry in self.entries.iter_mut().filter(|e| e.is_loading) {
            entry.is_loading = false;
            entry.response = None;
            entry.error = Some(message.to_string());
            count += 1;
        }
        count
    }

    fn evict_overflow(&mut self) {
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pending_appends_loading_entry() {
        let mut history = ChatHistory::default();
        let id = history.push_pending("what does main.py do?".to_string());

        assert_eq!(history.len(), 1);
        let entry = history.get(id).unwrap();
        assert_eq!(entry.query, "what does main.py do?");
        assert!(entry.is_loading);
        assert!(entry.response.is_none());
        assert!(entry.error.is_none());
        assert_eq!(history.in_flight().map(|e| e.id), Some(id));
    }

    #[test]
    fn resolve_answered_clears_error_and_loading() {
        let mut history = ChatHistory::default();
        let id = history.push_pending("q".to_string());

        assert!(history.resolve(id, Resolution::Answered(Some("It parses CLI args.".to_string()))));

        let entry = history.get(id).unwrap();
        assert_eq!(entry.response.as_deref(), Some("It parses CLI args."));
        assert!(entry.error.is_none());
        assert!(!entry.is_loading);
        assert!(history.in_flight().is_none());
    }

    #[test]
    fn resolve_failed_sets_error_only() {
        let mut history = ChatHistory::default();
        let id = history.push_pending("q".to_string());

        history.resolve(id, Resolution::Failed("Repository not found".to_string()));

        let entry = history.get(id).unwrap();
        assert!(entry.response.is_none());
        assert_eq!(entry.error.as_deref(), Some("Repository not found"));
        assert!(!entry.is_loading);
    }

    #[test]
    fn resolve_targets_entry_by_id_not_position() {
        let mut history = ChatHistory::default();
        let first = history.push_pending("first".to_string());
        let second = history.push_pending("second".to_string());

        history.resolve(first, Resolution::Answered(Some("one".to_string())));

        assert_eq!(history.get(first).unwrap().response.as_deref(), Some("one"));
        assert!(history.get(second).unwrap().is_loading);
    }

    #[test]
    fn resolve_unknown_id_is_reported() {
        let mut history = ChatHistory::default();
        history.push_pending("q".to_string());
        assert!(!history.resolve(Uuid::new_v4(), Resolution::Failed("x".to_string())));
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let mut history = ChatHistory::new(2);
        history.push_pending("a".to_string());
        history.push_pending("b".to_string());
        let newest = history.push_pending("c".to_string());

        let queries: Vec<&str> = history.entries().iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["b", "c"]);
        assert!(history.get(newest).unwrap().is_loading);
    }

    #[test]
    fn from_entries_applies_cap() {
        let entries = (0..5)
            .map(|i| ChatEntry::pending(format!("q{i}")))
            .collect::<Vec<_>>();
        let history = ChatHistory::from_entries(entries, 3);
        assert_eq!(history.len(), 3);
        assert_eq!(history.entries()[0].query, "q2");
    }

    #[test]
    fn zero_cap_is_treated_as_one() {
        let history = ChatHistory::new(0);
        assert_eq!(history.max_entries(), 1);
    }

    #[test]
    fn interrupt_stale_fails_loading_entries() {
        let mut history = ChatHistory::default();
        let done = history.push_pending("done".to_string());
        history.resolve(done, Resolution::Answered(Some("ok".to_string())));
        let stuck = history.push_pending("stuck".to_string());

        assert_eq!(history.interrupt_stale("Interrupted"), 1);

        let entry = history.get(stuck).unwrap();
        assert!(!entry.is_loading);
        assert_eq!(entry.error.as_deref(), Some("Interrupted"));
        assert_eq!(history.get(done).unwrap().response.as_deref(), Some("ok"));
    }

    #[test]
    fn entry_serializes_with_camel_case_keys() {
        let entry = ChatEntry::pending("q".to_string());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["isLoading"], true);
        assert_eq!(json["query"], "q");
        assert!(json["response"].is_null());
    }

    #[test]
    fn entry_without_id_gets_one_on_load() {
        let entry: ChatEntry = serde_json::from_str(
            r#"{ "query": "q", "response": "r", "error": null, "isLoading": false }"#,
        )
        .unwrap();
        assert_eq!(entry.response.as_deref(), Some("r"));
        assert!(!entry.id.is_nil());
    }
}
