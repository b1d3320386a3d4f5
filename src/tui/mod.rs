//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values and performs the
//! `Effect`s the reducer asks for.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (loader, pending reply, reply fade-in): draws every ~80ms.
//! - **Idle**: sleeps up to 500ms, only redraws on events, terminal resize or
//!   actions arriving from background tasks.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
mod tasks;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::api::{Backend, HttpBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::rotation::Rotation;
use crate::core::session::{self, SessionStore};
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{ChatPanelState, InputBox, InputEvent, loader_rotation};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Longest query the input box accepts, in characters.
pub const MAX_QUERY_CHARS: usize = 1500;

const REPO_PLACEHOLDER: &str = "https://github.com/owner/repo";
const QUERY_PLACEHOLDER: &str = "Ask something about the repository...";

/// Which input receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Repo,
    Query,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub repo_box: InputBox,
    pub query_box: InputBox,
    pub focus: Focus,
    pub chat_panel: ChatPanelState,
    /// Startup loader messages
    pub loader: Rotation,
    /// Origin for spinner animation
    pub started_at: Instant,
}

impl TuiState {
    pub fn new(now: Instant) -> Self {
        let mut loader = loader_rotation();
        loader.start(now);
        Self {
            repo_box: InputBox::single_line("repository", REPO_PLACEHOLDER),
            query_box: InputBox::multi_line("question", QUERY_PLACEHOLDER)
                .with_max_chars(MAX_QUERY_CHARS),
            // Nothing can be asked before a repository is given.
            focus: Focus::Repo,
            chat_panel: ChatPanelState::new(),
            loader,
            started_at: now,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Repo => Focus::Query,
            Focus::Query => Focus::Repo,
        };
    }

    /// Refresh component props from the current state.
    pub fn sync_props(&mut self, app: &App) {
        let overlay_open = app.confirm_clear_cache;
        self.repo_box.focused = self.focus == Focus::Repo && !overlay_open;
        self.query_box.focused = self.focus == Focus::Query && !overlay_open;
        self.query_box.title = if app.is_querying {
            "question (waiting for reply...)".to_string()
        } else {
            format!(
                "question ({}/{})",
                self.query_box.text().chars().count(),
                MAX_QUERY_CHARS
            )
        };
    }

    /// Whether the next frames change on their own, without input.
    fn is_animating(&self, app: &App, now: Instant) -> bool {
        app.is_loading || app.is_querying || self.chat_panel.is_fading(now)
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste, Hide);
    }
}

/// Translate one terminal event into at most one `Action`, updating purely
/// presentational state (focus, scroll, input buffers) along the way.
///
/// Precedence: force quit, then the confirmation overlay, then a pending
/// notice (dismissed by any key), then the loader, then normal input.
fn route_event(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    let is_scroll = matches!(
        event,
        TuiEvent::ScrollUp | TuiEvent::ScrollDown | TuiEvent::ScrollPageUp | TuiEvent::ScrollPageDown
    );

    match event {
        TuiEvent::Resize => return None,
        TuiEvent::ForceQuit => return Some(Action::Quit),
        _ => {}
    }

    if app.confirm_clear_cache {
        return match event {
            TuiEvent::InputChar('y' | 'Y') | TuiEvent::Submit => Some(Action::ConfirmClearCache),
            TuiEvent::InputChar('n' | 'N') | TuiEvent::Escape => Some(Action::CancelClearCache),
            _ => None,
        };
    }

    if app.notice.is_some() && !is_scroll {
        return Some(Action::DismissNotice);
    }

    if app.is_loading {
        return matches!(event, TuiEvent::Escape).then_some(Action::Quit);
    }

    match event {
        TuiEvent::Escape => return Some(Action::Quit),
        TuiEvent::FocusNext => {
            tui.toggle_focus();
            return None;
        }
        TuiEvent::ClearCache => return Some(Action::RequestClearCache),
        _ if is_scroll => {
            tui.chat_panel.handle_event(event);
            return None;
        }
        _ => {}
    }

    match tui.focus {
        Focus::Repo => match tui.repo_box.handle_event(event)? {
            InputEvent::Submit(_) => {
                tui.focus = Focus::Query;
                None
            }
            InputEvent::ContentChanged => {
                Some(Action::RepoUrlChanged(tui.repo_box.text().to_string()))
            }
        },
        Focus::Query => match tui.query_box.handle_event(event)? {
            InputEvent::Submit(text) => Some(Action::SubmitQuery(text)),
            InputEvent::ContentChanged => None,
        },
    }
}

/// Apply `action` and carry out the resulting effect. Returns true to quit.
fn dispatch(
    app: &mut App,
    tui: &mut TuiState,
    action: Action,
    store: &SessionStore,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match update(app, action) {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SpawnQuery {
            entry_id,
            repo_url,
            query,
        } => {
            tui.query_box.clear();
            tasks::spawn_query(app.backend.clone(), entry_id, repo_url, query, tx.clone());
            session::save_current_session(app, store);
            false
        }
        Effect::SpawnClearCache => {
            tasks::spawn_clear_cache(app.backend.clone(), tx.clone());
            false
        }
        Effect::SaveSession => {
            session::save_current_session(app, store);
            false
        }
    }
}

pub fn run(config: ResolvedConfig, store: SessionStore) -> std::io::Result<()> {
    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(Some(config.backend_url.clone())));
    let mut app = App::new(backend, config.max_history);

    match store.load() {
        Ok(Some(entries)) => {
            info!(
                "Restoring {} chat entries from {}",
                entries.len(),
                store.path().display()
            );
            app.restore_history(entries);
        }
        Ok(None) => debug!("No saved session at {}", store.path().display()),
        Err(e) => warn!("Failed to load session {}: {}", store.path().display(), e),
    }

    let mut tui = TuiState::new(Instant::now());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Failed to enable terminal modes: {}", e))
        .ok();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let poller = tasks::spawn_poller(
        app.backend.clone(),
        config.poll_interval,
        config.loader_min,
        tx.clone(),
    );

    let mut needs_redraw = true;
    let mut was_animating = false;

    loop {
        let now = Instant::now();
        tui.sync_props(&app);
        tui.chat_panel.observe(app.chat.entries(), now);

        // One extra frame after an animation ends so its final state is drawn.
        let animating = tui.is_animating(&app, now);
        if animating || was_animating {
            needs_redraw = true;
        }
        was_animating = animating;

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, now))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = route_event(&app, &mut tui, &event)
                && dispatch(&mut app, &mut tui, action, &store, &tx)
            {
                should_quit = true;
                break;
            }
        }

        if should_quit {
            break;
        }

        // Handle background task results
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, &mut tui, action, &store, &tx) {
                should_quit = true;
                break;
            }
        }

        if should_quit {
            break;
        }
    }

    poller.abort();
    session::save_current_session(&app, &store);
    info!("CodeLens shutting down");

    ratatui::restore();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Notice;
    use crate::test_support::test_app;

    fn ready() -> (App, TuiState) {
        let mut app = test_app();
        app.is_loading = false;
        (app, TuiState::new(Instant::now()))
    }

    fn type_into(app: &mut App, tui: &mut TuiState, text: &str) {
        for c in text.chars() {
            if let Some(action) = route_event(app, tui, &TuiEvent::InputChar(c)) {
                update(app, action);
            }
        }
    }

    #[test]
    fn force_quit_always_quits() {
        let (mut app, mut tui) = ready();
        app.confirm_clear_cache = true;
        app.is_loading = true;
        assert!(matches!(
            route_event(&app, &mut tui, &TuiEvent::ForceQuit),
            Some(Action::Quit)
        ));
    }

    #[test]
    fn typing_in_repo_box_updates_repo_url() {
        let (mut app, mut tui) = ready();
        type_into(&mut app, &mut tui, "https://github.com/x/y");
        assert_eq!(app.repo_url, "https://github.com/x/y");
    }

    #[test]
    fn enter_in_repo_box_moves_focus() {
        let (app, mut tui) = ready();
        assert_eq!(tui.focus, Focus::Repo);
        assert!(route_event(&app, &mut tui, &TuiEvent::Submit).is_none());
        assert_eq!(tui.focus, Focus::Query);
    }

    #[test]
    fn tab_toggles_focus() {
        let (app, mut tui) = ready();
        route_event(&app, &mut tui, &TuiEvent::FocusNext);
        assert_eq!(tui.focus, Focus::Query);
        route_event(&app, &mut tui, &TuiEvent::FocusNext);
        assert_eq!(tui.focus, Focus::Repo);
    }

    #[test]
    fn submit_in_query_box_carries_text() {
        let (mut app, mut tui) = ready();
        tui.focus = Focus::Query;
        type_into(&mut app, &mut tui, "what does main.py do?");
        match route_event(&app, &mut tui, &TuiEvent::Submit) {
            Some(Action::SubmitQuery(text)) => assert_eq!(text, "what does main.py do?"),
            other => panic!("Expected SubmitQuery, got {:?}", other),
        }
    }

    #[test]
    fn rejected_submit_keeps_query_text() {
        let (mut app, mut tui) = ready();
        tui.focus = Focus::Query;
        type_into(&mut app, &mut tui, "question");
        let action = route_event(&app, &mut tui, &TuiEvent::Submit).unwrap();
        assert_eq!(update(&mut app, action), Effect::None);
        assert!(app.show_repo_warning);
        assert_eq!(tui.query_box.text(), "question");
    }

    #[test]
    fn confirm_overlay_captures_keys() {
        let (mut app, mut tui) = ready();
        app.confirm_clear_cache = true;
        assert!(matches!(
            route_event(&app, &mut tui, &TuiEvent::InputChar('y')),
            Some(Action::ConfirmClearCache)
        ));
        assert!(matches!(
            route_event(&app, &mut tui, &TuiEvent::Escape),
            Some(Action::CancelClearCache)
        ));
        assert!(route_event(&app, &mut tui, &TuiEvent::InputChar('x')).is_none());
        assert_eq!(tui.repo_box.text(), "", "overlay keys never reach the inputs");
    }

    #[test]
    fn any_key_dismisses_notice() {
        let (mut app, mut tui) = ready();
        app.notice = Some(Notice::info("Cache cleared successfully"));
        assert!(matches!(
            route_event(&app, &mut tui, &TuiEvent::InputChar('a')),
            Some(Action::DismissNotice)
        ));
        assert_eq!(tui.repo_box.text(), "");
        assert!(route_event(&app, &mut tui, &TuiEvent::ScrollUp).is_none());
    }

    #[test]
    fn only_quit_keys_work_while_loading() {
        let (mut app, mut tui) = ready();
        app.is_loading = true;
        assert!(route_event(&app, &mut tui, &TuiEvent::InputChar('a')).is_none());
        assert!(route_event(&app, &mut tui, &TuiEvent::ClearCache).is_none());
        assert!(matches!(
            route_event(&app, &mut tui, &TuiEvent::Escape),
            Some(Action::Quit)
        ));
    }

    #[test]
    fn ctrl_k_requests_clear() {
        let (app, mut tui) = ready();
        assert!(matches!(
            route_event(&app, &mut tui, &TuiEvent::ClearCache),
            Some(Action::RequestClearCache)
        ));
    }

    #[test]
    fn ctrl_k_does_nothing_while_backend_unreachable() {
        let (mut app, mut tui) = ready();
        app.page_error = Some(crate::core::action::POLL_ERROR.to_string());
        let action = route_event(&app, &mut tui, &TuiEvent::ClearCache).unwrap();
        assert_eq!(update(&mut app, action), Effect::None);
        assert!(!app.confirm_clear_cache);
    }

    #[tokio::test]
    async fn submitted_query_clears_box_and_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let (tx, rx) = mpsc::channel();
        let (mut app, mut tui) = ready();
        type_into(&mut app, &mut tui, "https://github.com/x/y");
        tui.focus = Focus::Query;
        type_into(&mut app, &mut tui, "what does main.py do?");

        let action = route_event(&app, &mut tui, &TuiEvent::Submit).unwrap();
        assert!(!dispatch(&mut app, &mut tui, action, &store, &tx));
        assert_eq!(tui.query_box.text(), "");
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].query, "what does main.py do?");
        assert!(saved[0].is_loading);

        // The query task reports back through the channel.
        let finished = tokio::task::spawn_blocking(move || rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(finished, Action::QueryFinished { .. }));
        assert!(!dispatch(&mut app, &mut tui, finished, &store, &tx));
        let saved = store.load().unwrap().unwrap();
        assert!(!saved[0].is_loading);
        assert!(!app.is_querying);
    }

    #[test]
    fn query_title_shows_count_and_waiting_state() {
        let (mut app, mut tui) = ready();
        tui.focus = Focus::Query;
        type_into(&mut app, &mut tui, "abc");
        tui.sync_props(&app);
        assert_eq!(tui.query_box.title, "question (3/1500)");

        app.is_querying = true;
        tui.sync_props(&app);
        assert!(tui.query_box.title.contains("waiting"));
    }
}
