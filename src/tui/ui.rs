use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::state::{App, NoticeKind};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    CLEAR_CACHE_PROMPT, ChatPanel, ConfirmDialog, Loader, RepoBar, STATUS_PANEL_WIDTH,
    StatusPanel, spinner_at,
};

/// Below this many columns for the chat, the status panel is hidden.
const MIN_CHAT_WIDTH: u16 = 40;

const HELP_TEXT: &str =
    "Tab focus · Enter send · Ctrl+J newline · Ctrl+K clear cache · PgUp/PgDn scroll · Esc quit";
/// Help line while the backend is unreachable; cache clearing is unavailable.
const OFFLINE_HELP_TEXT: &str =
    "Tab focus · Enter send · Ctrl+J newline · PgUp/PgDn scroll · Esc quit";

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, now: Instant) {
    use Constraint::{Length, Min};

    let area = frame.area();
    let spinner = spinner_at(now.saturating_duration_since(tui.started_at));

    if app.is_loading {
        Loader {
            rotation: &tui.loader,
            now,
            spinner,
        }
        .render(frame, area);
        return;
    }

    let mut repo_bar = RepoBar {
        input: &mut tui.repo_box,
        show_warning: app.show_repo_warning,
    };
    let repo_height = repo_bar.height(area.width);
    let [repo_area, main_area, footer_area] =
        Layout::vertical([Length(repo_height), Min(0), Length(1)]).areas(area);
    repo_bar.render(frame, repo_area);

    let chat_area = if main_area.width >= STATUS_PANEL_WIDTH + MIN_CHAT_WIDTH {
        let [status_area, chat_area] =
            Layout::horizontal([Length(STATUS_PANEL_WIDTH), Min(0)]).areas(main_area);
        StatusPanel {
            health: app.health.as_ref(),
            cache: app.cache.as_ref(),
            ai_stats: app.ai_stats.as_ref(),
            page_error: app.page_error.as_deref(),
            backend_url: app.backend.base_url(),
        }
        .render(frame, status_area);
        chat_area
    } else {
        main_area
    };

    let query_height = tui.query_box.calculate_height(chat_area.width);
    let [transcript_area, input_area] =
        Layout::vertical([Min(0), Length(query_height)]).areas(chat_area);

    ChatPanel {
        state: &mut tui.chat_panel,
        entries: app.chat.entries(),
        placeholder: app.placeholder_text(now),
        spinner,
        now,
    }
    .render(frame, transcript_area);
    tui.query_box.render(frame, input_area);

    draw_footer(frame, footer_area, app);

    if app.confirm_clear_cache {
        ConfirmDialog {
            message: CLEAR_CACHE_PROMPT,
        }
        .render(frame, area);
    }
}

/// Notice if one is pending, otherwise the key help.
fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.notice {
        Some(notice) => {
            let color = match notice.kind {
                NoticeKind::Info => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            Line::from(vec![
                Span::styled(
                    notice.text.clone(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled("  (press any key)", Style::default().fg(Color::DarkGray)),
            ])
        }
        None => {
            let help = if app.page_error.is_some() {
                OFFLINE_HELP_TEXT
            } else {
                HELP_TEXT
            };
            Line::from(Span::styled(help, Style::default().fg(Color::DarkGray)))
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AiStats, QueryResponse};
    use crate::core::action::{Action, Effect, update};
    use crate::core::state::Notice;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(app: &App, tui: &mut TuiState, width: u16, height: u16) -> String {
        let now = Instant::now();
        tui.sync_props(app);
        tui.chat_panel.observe(app.chat.entries(), now);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, now)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn loader_replaces_everything_while_loading() {
        let app = test_app();
        let mut tui = TuiState::new(Instant::now());
        let text = draw(&app, &mut tui, 100, 30);
        assert!(text.contains("Pinging the LLM"));
        assert!(!text.contains("Last AI Reply Stats"));
    }

    #[test]
    fn main_view_after_loading() {
        let mut app = test_app();
        app.is_loading = false;
        let mut tui = TuiState::new(Instant::now());
        let text = draw(&app, &mut tui, 120, 30);
        assert!(text.contains("repository"));
        assert!(text.contains("Last AI Reply Stats"));
        assert!(text.contains("Ctrl+K clear cache"));
    }

    #[test]
    fn narrow_terminal_hides_status_panel() {
        let mut app = test_app();
        app.is_loading = false;
        let mut tui = TuiState::new(Instant::now());
        let text = draw(&app, &mut tui, 60, 20);
        assert!(!text.contains("Last AI Reply Stats"));
    }

    #[test]
    fn failed_poll_hides_clear_cache_hint() {
        let mut app = test_app();
        app.is_loading = false;
        app.page_error = Some(crate::core::action::POLL_ERROR.to_string());
        let mut tui = TuiState::new(Instant::now());
        let text = draw(&app, &mut tui, 120, 30);
        assert!(text.contains("Failed to fetch data"));
        assert!(!text.contains("Ctrl+K clear cache"));
    }

    #[test]
    fn notice_replaces_help_line() {
        let mut app = test_app();
        app.is_loading = false;
        app.notice = Some(Notice::info("Cache cleared successfully"));
        let mut tui = TuiState::new(Instant::now());
        let text = draw(&app, &mut tui, 120, 30);
        assert!(text.contains("Cache cleared successfully"));
        assert!(!text.contains("Ctrl+K clear cache"));
    }

    #[test]
    fn confirm_overlay_when_requested() {
        let mut app = test_app();
        app.is_loading = false;
        app.confirm_clear_cache = true;
        let mut tui = TuiState::new(Instant::now());
        let text = draw(&app, &mut tui, 120, 30);
        assert!(text.contains("clear all cached"));
    }

    #[test]
    fn repo_warning_is_shown() {
        let mut app = test_app();
        app.is_loading = false;
        app.show_repo_warning = true;
        let mut tui = TuiState::new(Instant::now());
        let text = draw(&app, &mut tui, 120, 30);
        assert!(text.contains("Share the repo before I start guessing!"));
    }

    #[test]
    fn answered_query_shows_bubbles_and_stats() {
        let mut app = test_app();
        app.is_loading = false;
        update(&mut app, Action::RepoUrlChanged("https://github.com/x/y".to_string()));
        let Effect::SpawnQuery { entry_id, .. } =
            update(&mut app, Action::SubmitQuery("what does main.py do?".to_string()))
        else {
            panic!("Expected SpawnQuery");
        };
        update(
            &mut app,
            Action::QueryFinished {
                entry_id,
                result: Ok(QueryResponse {
                    response: Some("It parses CLI args.".to_string()),
                    metadata: Some(AiStats {
                        files_analyzed: Some(3),
                        total_files: Some(10),
                        tokens_used: Some(120),
                        repository: Some("x/y".to_string()),
                    }),
                }),
            },
        );

        let mut tui = TuiState::new(Instant::now());
        let text = draw(&app, &mut tui, 120, 30);
        assert!(text.contains("what does main.py do?"));
        assert!(text.contains("It parses CLI args."));
        assert!(text.contains("Files analyzed: 3"));
        assert!(text.contains("Total files: 10"));
        assert!(text.contains("Tokens used: 120"));
        assert!(text.contains("Repository: x/y"));
    }

    #[test]
    fn pending_query_shows_placeholder() {
        let mut app = test_app();
        app.is_loading = false;
        update(&mut app, Action::RepoUrlChanged("https://github.com/x/y".to_string()));
        update(&mut app, Action::SubmitQuery("q".to_string()));

        let mut tui = TuiState::new(Instant::now());
        let text = draw(&app, &mut tui, 120, 30);
        assert!(text.contains("Warming up the local brain"));
        assert!(text.contains("waiting for reply"));
    }
}
