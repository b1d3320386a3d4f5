//! # StatusPanel Component
//!
//! Side panel with backend health, repository cache stats and the metadata
//! of the last answered query. A failed poll replaces the status sections
//! with an error banner until the next successful poll.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Wrap};

use crate::api::{AiStats, CacheSnapshot, HealthSnapshot};
use crate::tui::component::Component;

/// Preferred width of the panel, borders included.
pub const STATUS_PANEL_WIDTH: u16 = 34;

pub struct StatusPanel<'a> {
    pub health: Option<&'a HealthSnapshot>,
    pub cache: Option<&'a CacheSnapshot>,
    pub ai_stats: Option<&'a AiStats>,
    pub page_error: Option<&'a str>,
    pub backend_url: &'a str,
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn field(label: &str, value: impl Into<String>, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        Span::styled(value.into(), Style::default().fg(color)),
    ])
}

/// Green for states that read as up, red for down, yellow for anything else.
fn state_color(value: &str) -> Color {
    match value.to_ascii_lowercase().as_str() {
        "healthy" | "online" | "ok" | "connected" | "authenticated" => Color::Green,
        "offline" | "unhealthy" | "error" | "not authenticated" => Color::Red,
        _ => Color::Yellow,
    }
}

impl<'a> StatusPanel<'a> {
    fn status_lines(&self) -> Vec<Line<'static>> {
        let fallback = HealthSnapshot::default();
        let health = self.health.unwrap_or(&fallback);
        let cache_fallback = CacheSnapshot::default();
        let cache = self.cache.unwrap_or(&cache_fallback);

        vec![
            heading("Backend"),
            field("Status", health.status_label(), state_color(health.status_label())),
            field("API", health.api_label(), state_color(health.api_label())),
            field("Ollama", health.ollama_label(), state_color(health.ollama_label())),
            field("Model", health.model_label(), Color::White),
            field("GitHub", health.github_label(), state_color(health.github_label())),
            field("User", health.user_label(), Color::White),
            Line::default(),
            heading("Cache"),
            field("Cached repos", cache.total_repos().to_string(), Color::White),
            field("Size", format!("{} MB", cache.size_mb_label()), Color::White),
        ]
    }

    fn error_lines(message: &str) -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                "⚠ Backend unreachable".to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(Color::Red),
            )),
        ]
    }

    fn stats_lines(&self) -> Vec<Line<'static>> {
        let fallback = AiStats::default();
        let stats = self.ai_stats.unwrap_or(&fallback);
        vec![
            heading("Last AI Reply Stats"),
            field(
                "Files analyzed",
                stats.files_analyzed.unwrap_or(0).to_string(),
                Color::White,
            ),
            field(
                "Total files",
                stats.total_files.unwrap_or(0).to_string(),
                Color::White,
            ),
            field(
                "Tokens used",
                stats.tokens_used.unwrap_or(0).to_string(),
                Color::White,
            ),
            field("Repository", stats.repository_label(), Color::White),
        ]
    }
}

impl<'a> Component for StatusPanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut lines = match self.page_error {
            Some(message) => Self::error_lines(message),
            None => self.status_lines(),
        };
        lines.push(Line::default());
        lines.extend(self.stats_lines());
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            self.backend_url.to_string(),
            Style::default().fg(Color::DarkGray),
        )));

        let block = Block::bordered()
            .title("status")
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .padding(Padding::horizontal(1));

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}
