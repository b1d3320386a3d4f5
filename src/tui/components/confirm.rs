use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Wrap};

use crate::tui::component::Component;

pub const CLEAR_CACHE_PROMPT: &str = "Are you sure you want to clear all cached repos?";

/// Rect of `width` x `height` centered in `area`, clamped to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}

/// Modal yes/no prompt drawn over the main view.
pub struct ConfirmDialog<'a> {
    pub message: &'a str,
}

impl<'a> Component for ConfirmDialog<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let dialog = centered_rect(56, 6, area);
        frame.render_widget(Clear, dialog);

        let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let text = vec![
            Line::from(self.message),
            Line::default(),
            Line::from(vec![
                Span::styled("y", key),
                Span::raw(" / Enter confirm   "),
                Span::styled("n", key),
                Span::raw(" / Esc cancel"),
            ]),
        ];

        let block = Block::bordered()
            .title("clear cache")
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow));

        frame.render_widget(
            Paragraph::new(text)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            dialog,
        );
    }
}
