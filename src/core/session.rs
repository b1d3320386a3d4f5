//! # Session Persistence
//!
//! Save/load the chat transcript to `~/.codelens/sessions/<name>.json`.
//!
//! A session is the terminal analogue of a browser tab: restarting CodeLens
//! with the same `--session` name picks up the same transcript. The file is
//! read once at startup and rewritten after every transcript change.
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::chat::ChatEntry;
use crate::core::state::App;

pub const DEFAULT_SESSION: &str = "default";

/// On-disk shape of a session file.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    pub saved_at: i64,
    pub entries: Vec<ChatEntry>,
}

/// Returns `~/.codelens/sessions/`, creating it if needed.
pub fn sessions_dir() -> io::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;
    let dir = home.join(".codelens").join("sessions");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Reduce a session name to something safe to use as a file stem.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        DEFAULT_SESSION.to_string()
    } else {
        cleaned
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// One named session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store for `name` under [`sessions_dir`].
    pub fn named(name: &str) -> io::Result<Self> {
        let dir = sessions_dir()?;
        Ok(Self::new(dir.join(format!("{}.json", sanitize_name(name)))))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored transcript. `Ok(None)` when nothing was saved yet.
    pub fn load(&self) -> io::Result<Option<Vec<ChatEntry>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let file: SessionFile = serde_json::from_str(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(file.entries))
    }

    /// Persist `entries`. An empty transcript is never written, so a fresh
    /// run can't clobber a saved one before anything was asked.
    pub fn save(&self, entries: &[ChatEntry]) -> io::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let file = SessionFile {
            saved_at: Utc::now().timestamp(),
            entries: entries.to_vec(),
        };
        atomic_write_json(&self.path, &file)
    }

    /// Remove the stored transcript, if any.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Save the app's transcript, logging instead of failing. This is the single
/// entry point the TUI uses after every transcript change.
pub fn save_current_session(app: &App, store: &SessionStore) {
    if let Err(e) = store.save(app.chat.entries()) {
        warn!("Failed to save session to {}: {}", store.path().display(), e);
    } else {
        debug!(
            "Session saved: {} entries to {}",
            app.chat.len(),
            store.path().display()
        );
    }
}
