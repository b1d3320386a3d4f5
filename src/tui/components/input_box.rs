//! # InputBox Component
//!
//! Editable text field used for both the repository URL and the query.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, backspace/delete, cursor movement)
//! - Emit `Submit` on Enter without clearing: the parent decides whether the
//!   submission was accepted and calls [`InputBox::clear`] itself
//! - Enforce an optional character cap
//! - Wrap and scroll multi-line content, keeping the cursor visible
//!
//! The buffer and cursor are internal state. `title`, `focused` and
//! `placeholder` are props refreshed by the parent.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::components::query::wrap_options;
use crate::tui::event::TuiEvent;

/// Border (2) + padding (2) consumed horizontally by the bordered block
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
const VERTICAL_OVERHEAD: u16 = 2;
/// Maximum visible content lines before internal scrolling kicks in
const MAX_VISIBLE_LINES: u16 = 5;
/// Offset from area edge to content (border + padding)
const CONTENT_OFFSET: u16 = 2;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed; carries the current buffer
    Submit(String),
    /// Buffer or cursor changed
    ContentChanged,
}

/// Wrap each logical line separately so blank lines and a trailing newline
/// still occupy a row.
fn wrapped_lines(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for logical in text.split('\n') {
        let wrapped = textwrap::wrap(logical, wrap_options(width));
        if wrapped.is_empty() {
            out.push(String::new());
        } else {
            out.extend(wrapped.into_iter().map(|l| l.into_owned()));
        }
    }
    out
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

pub struct InputBox {
    /// Text buffer (internal state)
    buffer: String,
    /// Cursor position as byte offset in buffer
    cursor: usize,
    /// Block title (prop)
    pub title: String,
    /// Hint shown while the buffer is empty (prop)
    pub placeholder: String,
    /// Whether this box receives keystrokes (prop)
    pub focused: bool,
    multiline: bool,
    max_chars: Option<usize>,
}

impl InputBox {
    /// A single-line field; newlines are dropped.
    pub fn single_line(title: &str, placeholder: &str) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            title: title.to_string(),
            placeholder: placeholder.to_string(),
            focused: false,
            multiline: false,
            max_chars: None,
        }
    }

    /// A wrapping multi-line field (Ctrl+J inserts a newline).
    pub fn multi_line(title: &str, placeholder: &str) -> Self {
        Self {
            multiline: true,
            ..Self::single_line(title, placeholder)
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    fn remaining_capacity(&self) -> usize {
        self.max_chars
            .map(|max| max.saturating_sub(self.buffer.chars().count()))
            .unwrap_or(usize::MAX)
    }

    fn insert(&mut self, text: &str) -> bool {
        let filtered: String = if self.multiline {
            text.to_string()
        } else {
            text.chars().filter(|c| *c != '\n' && *c != '\r').collect()
        };
        let allowed: String = filtered.chars().take(self.remaining_capacity()).collect();
        if allowed.is_empty() {
            return false;
        }
        self.buffer.insert_str(self.cursor, &allowed);
        self.cursor += allowed.len();
        true
    }

    /// Height needed for the current content, clamped to the visible maximum.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        if !self.multiline {
            return 1 + VERTICAL_OVERHEAD;
        }
        let width = area_width.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        let lines = wrapped_lines(&self.buffer, width).len() as u16;
        lines.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// (row, column) of the cursor within the wrapped content.
    fn cursor_row_col(&self, width: usize) -> (usize, u16) {
        let before = &self.buffer[..self.cursor];
        let mut logicals: Vec<&str> = before.split('\n').collect();
        let current = logicals.pop().unwrap_or("");

        let rows_above: usize = logicals
            .iter()
            .map(|l| wrapped_lines(l, width).len())
            .sum();

        let segments = textwrap::wrap(current, wrap_options(width));
        let row_in_line = segments.len().saturating_sub(1);
        let consumed: usize = segments
            .iter()
            .take(row_in_line)
            .map(|s| s.width())
            .sum();
        let col = current.width().saturating_sub(consumed);

        (rows_above + row_in_line, col as u16)
    }

    fn render_single_line(&self, frame: &mut Frame, inner: Rect) {
        let width = inner.width as usize;
        let before = &self.buffer[..self.cursor];
        // Scroll horizontally so the cursor stays inside the field.
        let overflow = before.width().saturating_sub(width.saturating_sub(1));

        let mut skipped = 0;
        let mut start = 0;
        for (i, c) in self.buffer.char_indices() {
            if skipped >= overflow {
                start = i;
                break;
            }
            skipped += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            start = i + c.len_utf8();
        }

        let visible = &self.buffer[start..];
        frame.render_widget(
            Paragraph::new(visible).style(self.text_style()),
            inner,
        );

        if self.focused {
            let col = before.width().saturating_sub(skipped) as u16;
            frame.set_cursor_position((inner.x + col.min(inner.width), inner.y));
        }
    }

    fn render_multi_line(&self, frame: &mut Frame, inner: Rect) {
        let width = inner.width as usize;
        let lines = wrapped_lines(&self.buffer, width);
        let (cursor_row, cursor_col) = self.cursor_row_col(width);

        let visible_rows = inner.height.max(1) as usize;
        let scroll = cursor_row.saturating_sub(visible_rows - 1);

        let text: Vec<Line> = lines
            .into_iter()
            .skip(scroll)
            .take(visible_rows)
            .map(Line::from)
            .collect();
        frame.render_widget(Paragraph::new(text).style(self.text_style()), inner);

        if self.focused {
            let row = (cursor_row - scroll) as u16;
            frame.set_cursor_position((inner.x + cursor_col.min(inner.width), inner.y + row));
        }
    }

    fn text_style(&self) -> Style {
        if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        }
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(self.title.as_str())
            .padding(ratatui::widgets::Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.buffer.is_empty() {
            let hint = Span::styled(
                self.placeholder.as_str(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(Paragraph::new(Line::from(hint)), inner);
            if self.focused {
                frame.set_cursor_position((area.x + CONTENT_OFFSET, area.y + 1));
            }
            return;
        }

        if self.multiline {
            self.render_multi_line(frame, inner);
        } else {
            self.render_single_line(frame, inner);
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => self
                .insert(c.encode_utf8(&mut [0u8; 4]))
                .then_some(InputEvent::ContentChanged),
            TuiEvent::Paste(text) => self.insert(text).then_some(InputEvent::ContentChanged),
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                (self.cursor != line_start).then(|| {
                    self.cursor = line_start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.buffer.len());
                (self.cursor != line_end).then(|| {
                    self.cursor = line_end;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::Submit => Some(InputEvent::Submit(self.buffer.clone())),
            _ => None,
        }
    }
}
