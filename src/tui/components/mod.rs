//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Created each frame from the data they display:
//! - `Query` / `Response`: one chat turn's request and reply bubbles
//! - `StatusPanel`: backend health, cache and last-reply stats
//! - `Loader`: full-screen startup indicator
//! - `ConfirmDialog`: yes/no overlay for clearing the cache
//!
//! ### Stateful Components (Event-Driven)
//!
//! Own state that persists in `TuiState` and emit events:
//! - `InputBox`: text field used for the repository URL and the query
//! - `ChatPanel`: scrollable transcript over `ChatPanelState`
//!
//! Components receive external data as props (struct fields), never by
//! reaching into `App` themselves.
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── input_box.rs     (Editable text field)
//! ├── repo_bar.rs      (Repository field + missing-repo warning)
//! ├── query.rs         (Outgoing bubble)
//! ├── response.rs      (Reply bubble, fade-in, pending placeholder)
//! ├── chat_panel.rs    (Scrollable transcript)
//! ├── status_panel.rs  (Backend / cache / stats side panel)
//! ├── loader.rs        (Startup loader)
//! └── confirm.rs       (Confirmation overlay)
//! ```

pub mod chat_panel;
pub mod confirm;
pub mod input_box;
pub mod loader;
pub mod query;
pub mod repo_bar;
pub mod response;
pub mod status_panel;

pub use chat_panel::{ChatPanel, ChatPanelState};
pub use confirm::{CLEAR_CACHE_PROMPT, ConfirmDialog};
pub use input_box::{InputBox, InputEvent};
pub use loader::{Loader, loader_rotation, spinner_at};
pub use repo_bar::RepoBar;
pub use status_panel::{STATUS_PANEL_WIDTH, StatusPanel};
