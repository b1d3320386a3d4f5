//! # Core Application Logic
//!
//! CodeLens's session logic. It knows nothing about any specific UI
//! technology. The reducer performs no I/O; persistence and config loading
//! are plain functions the TUI calls.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (App)          │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • Effect (I/O to run)  │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │ ── spawns requests ────▶ │    API     │
//!     │ (ratatui)  │ ◀── Actions over mpsc ── │ (reqwest)  │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all session state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`chat`]: The transcript (`ChatEntry`, `ChatHistory`)
//! - [`rotation`]: Time-driven message cycling
//! - [`session`]: Transcript persistence
//! - [`config`]: Settings and their override hierarchy

pub mod action;
pub mod chat;
pub mod config;
pub mod rotation;
pub mod session;
pub mod state;
