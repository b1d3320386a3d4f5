use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};

use crate::tui::components::query::wrap_options;

const CONTENT_PAD_H: u16 = 1;
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
const VERTICAL_OVERHEAD: u16 = 2;

/// Delay before freshly arrived reply content is drawn at full brightness.
pub const FADE_IN_DELAY: Duration = Duration::from_millis(50);

const ERROR_PREFIX: &str = "⚠ ";

/// Tracks when a reply's content became non-empty.
///
/// Lives in the TUI state keyed by entry id, so the fade survives the
/// per-frame recreation of [`Response`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FadeIn {
    shown_at: Option<Instant>,
}

impl FadeIn {
    /// Record whether the content is currently non-empty. Content going from
    /// empty to non-empty restarts the fade.
    pub fn observe(&mut self, has_content: bool, now: Instant) {
        match (has_content, self.shown_at) {
            (true, None) => self.shown_at = Some(now),
            (false, Some(_)) => self.shown_at = None,
            _ => {}
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        self.shown_at
            .is_some_and(|shown| now.saturating_duration_since(shown) >= FADE_IN_DELAY)
    }

    /// Still inside the delay window.
    pub fn is_fading_at(&self, now: Instant) -> bool {
        self.shown_at.is_some() && !self.is_visible_at(now)
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// The backend's side of a chat turn: an error line and/or the reply text.
#[derive(Clone, Copy)]
pub struct Response<'a> {
    pub response: Option<&'a str>,
    pub error: Option<&'a str>,
    /// False while the fade-in delay is running; the bubble is drawn dimmed.
    pub visible: bool,
}

impl<'a> Response<'a> {
    pub fn new(response: Option<&'a str>, error: Option<&'a str>) -> Self {
        Self {
            response,
            error,
            visible: true,
        }
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn has_content(&self) -> bool {
        non_empty(self.response).is_some() || non_empty(self.error).is_some()
    }

    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let text_width = width.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        let mut lines = Vec::new();

        if let Some(error) = non_empty(self.error) {
            let style = Style::default().fg(Color::Red);
            let message = format!("{ERROR_PREFIX}{error}");
            for line in textwrap::wrap(&message, wrap_options(text_width)) {
                lines.push(Line::from(Span::styled(line.into_owned(), style)));
            }
        }

        if let Some(reply) = non_empty(self.response) {
            for line in textwrap::wrap(reply, wrap_options(text_width)) {
                lines.push(Line::from(line.into_owned()));
            }
        }

        lines
    }

    pub fn calculate_height(response: Option<&str>, error: Option<&str>, width: u16) -> u16 {
        let reply = Response::new(response, error);
        if !reply.has_content() {
            return 0;
        }
        if width <= HORIZONTAL_OVERHEAD {
            return 1;
        }
        u16::try_from(reply.lines(width).len())
            .unwrap_or(u16::MAX)
            .max(1)
            .saturating_add(VERTICAL_OVERHEAD)
    }
}

impl<'a> Widget for Response<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.has_content() || area.width <= HORIZONTAL_OVERHEAD {
            return;
        }

        let mut style = Style::default().fg(Color::Blue);
        if !self.visible {
            style = style.add_modifier(Modifier::DIM);
        }
        let border_style = if non_empty(self.error).is_some() {
            Style::default().fg(Color::Red).add_modifier(Modifier::DIM)
        } else {
            style.add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title("codelens")
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner = block.inner(area);
        let lines = self.lines(area.width);
        block.render(area, buf);

        Paragraph::new(lines).style(style).render(inner, buf);
    }
}

/// Reply bubble for an entry still waiting on the backend.
#[derive(Clone, Copy)]
pub struct PendingReply<'a> {
    pub status: &'a str,
    pub spinner: &'a str,
}

impl<'a> PendingReply<'a> {
    pub const HEIGHT: u16 = 1 + VERTICAL_OVERHEAD;
}

impl<'a> Widget for PendingReply<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC);
        let block = Block::bordered()
            .title("codelens")
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Blue).add_modifier(Modifier::DIM))
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner = block.inner(area);
        block.render(area, buf);

        let line = Line::from(vec![
            Span::styled(format!("{} ", self.spinner), Style::default().fg(Color::Cyan)),
            Span::styled(self.status, style),
        ]);
        Paragraph::new(line).render(inner, buf);
    }
}
