//! # ChatPanel Component
//!
//! Scrollable transcript: one `Query` bubble and one reply per chat entry.
//!
//! `ChatPanel` is transient (built each frame) and wraps `&mut ChatPanelState`,
//! which persists scroll position and per-entry fade timers in the TUI state.
//! While pinned to the bottom, new entries scroll into view automatically.

use std::collections::HashMap;
use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};
use uuid::Uuid;

use crate::core::chat::ChatEntry;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::query::Query;
use crate::tui::components::response::{FadeIn, PendingReply, Response};
use crate::tui::event::TuiEvent;

/// Blank rows between consecutive chat turns.
const TURN_GAP: u16 = 1;

/// Tallest content a `ScrollView` can address.
const MAX_CONTENT_HEIGHT: u32 = u16::MAX as u32;

const EMPTY_HINT: &str = "Ask anything about the repository. Answers show up here.";

/// Scroll and fade state for the transcript. Persisted in `TuiState`.
pub struct ChatPanelState {
    pub scroll_state: ScrollViewState,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Total transcript height from the last render
    pub content_height: u16,
    fades: HashMap<Uuid, FadeIn>,
}

impl Default for ChatPanelState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPanelState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            viewport_height: 0,
            content_height: 0,
            fades: HashMap::new(),
        }
    }

    /// Update fade timers from the current transcript. Timers of entries
    /// that were evicted are dropped.
    pub fn observe(&mut self, entries: &[ChatEntry], now: Instant) {
        self.fades
            .retain(|id, _| entries.iter().any(|entry| entry.id == *id));
        for entry in entries {
            let has_content = !entry.is_loading
                && Response::new(entry.response.as_deref(), entry.error.as_deref()).has_content();
            self.fades.entry(entry.id).or_default().observe(has_content, now);
        }
    }

    /// Whether any reply is still inside its fade-in window.
    pub fn is_fading(&self, now: Instant) -> bool {
        self.fades.values().any(|fade| fade.is_fading_at(now))
    }

    fn reply_visible(&self, id: Uuid, now: Instant) -> bool {
        self.fades
            .get(&id)
            .is_none_or(|fade| fade.is_visible_at(now))
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

/// Heights of the query bubble and the reply part of one turn.
fn turn_heights(entry: &ChatEntry, width: u16) -> (u16, u16) {
    let query = Query::calculate_height(&entry.query, width);
    let reply = if entry.is_loading {
        PendingReply::HEIGHT
    } else {
        Response::calculate_height(entry.response.as_deref(), entry.error.as_deref(), width)
    };
    (query, reply)
}

/// Index of the oldest turn that still fits, together with every newer one,
/// in [`MAX_CONTENT_HEIGHT`] rows. The newest turn is always kept.
fn first_laid_out_turn(heights: &[(u16, u16)]) -> usize {
    let mut total: u32 = 0;
    for (index, (query, reply)) in heights.iter().enumerate().rev() {
        total += u32::from(*query) + u32::from(*reply) + u32::from(TURN_GAP);
        if total > MAX_CONTENT_HEIGHT {
            return (index + 1).min(heights.len() - 1);
        }
    }
    0
}

pub struct ChatPanel<'a> {
    pub state: &'a mut ChatPanelState,
    pub entries: &'a [ChatEntry],
    /// Status line for the pending reply bubble
    pub placeholder: &'a str,
    pub spinner: &'a str,
    pub now: Instant,
}

impl<'a> Component for ChatPanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.entries.is_empty() {
            let hint = Paragraph::new(EMPTY_HINT)
                .alignment(Alignment::Center)
                .style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                );
            let row = Rect {
                y: area.y + area.height / 2,
                height: 1.min(area.height),
                ..area
            };
            frame.render_widget(hint, row);
            self.state.content_height = 0;
            return;
        }

        let content_width = area.width.saturating_sub(1); // scrollbar column
        let heights: Vec<(u16, u16)> = self
            .entries
            .iter()
            .map(|entry| turn_heights(entry, content_width))
            .collect();
        let first = first_laid_out_turn(&heights);
        let entries = &self.entries[first..];
        let heights = &heights[first..];
        let total_height: u16 = heights
            .iter()
            .map(|(q, r)| q.saturating_add(*r).saturating_add(TURN_GAP))
            .fold(0u16, u16::saturating_add);

        self.state.viewport_height = area.height;
        self.state.content_height = total_height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let offset = self.state.scroll_state.offset().y;
        let visible_end = offset.saturating_add(area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y: u16 = 0;
        for (entry, &(query_h, reply_h)) in entries.iter().zip(heights) {
            let turn_end = y.saturating_add(query_h).saturating_add(reply_h);
            // Only turns overlapping the viewport (pinned offsets resolve below).
            let in_view = self.state.stick_to_bottom
                || (turn_end > offset && y < visible_end);

            if in_view {
                if query_h > 0 {
                    scroll_view.render_widget(
                        Query::new(&entry.query),
                        Rect::new(0, y, content_width, query_h),
                    );
                }
                let reply_rect = Rect::new(0, y.saturating_add(query_h), content_width, reply_h);
                if entry.is_loading {
                    scroll_view.render_widget(
                        PendingReply {
                            status: self.placeholder,
                            spinner: self.spinner,
                        },
                        reply_rect,
                    );
                } else if reply_h > 0 {
                    let visible = self.state.reply_visible(entry.id, self.now);
                    scroll_view.render_widget(
                        Response::new(entry.response.as_deref(), entry.error.as_deref())
                            .visible(visible),
                        reply_rect,
                    );
                }
            }

            y = turn_end.saturating_add(TURN_GAP);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

impl EventHandler for ChatPanelState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn answered(query: &str, response: &str) -> ChatEntry {
        let mut entry = ChatEntry::pending(query.to_string());
        entry.is_loading = false;
        entry.response = Some(response.to_string());
        entry
    }

    fn draw(state: &mut ChatPanelState, entries: &[ChatEntry], width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let now = Instant::now();
        terminal
            .draw(|f| {
                ChatPanel {
                    state: &mut *state,
                    entries,
                    placeholder: "Warming up the local brain",
                    spinner: "⠋",
                    now,
                }
                .render(f, f.area())
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn empty_transcript_shows_hint() {
        let mut state = ChatPanelState::new();
        let text = draw(&mut state, &[], 70, 10);
        assert!(text.contains("Ask anything about the repository."));
    }

    #[test]
    fn renders_query_and_reply() {
        let mut state = ChatPanelState::new();
        let entries = vec![answered("what does main.py do?", "It parses CLI args.")];
        let text = draw(&mut state, &entries, 60, 12);
        assert!(text.contains("what does main.py do?"));
        assert!(text.contains("It parses CLI args."));
    }

    #[test]
    fn loading_entry_shows_placeholder() {
        let mut state = ChatPanelState::new();
        let entries = vec![ChatEntry::pending("q".to_string())];
        let text = draw(&mut state, &entries, 60, 12);
        assert!(text.contains("Warming up the local brain"));
    }

    #[test]
    fn pinned_view_shows_latest_turn() {
        let mut state = ChatPanelState::new();
        let entries: Vec<ChatEntry> = (0..10)
            .map(|i| answered(&format!("question {i}"), &format!("answer {i}")))
            .collect();
        let text = draw(&mut state, &entries, 50, 10);
        assert!(text.contains("answer 9"));
        assert!(!text.contains("question 0"));
        assert!(state.content_height > state.viewport_height);
    }

    #[test]
    fn scrolling_up_unpins_and_scrolling_down_repins() {
        let mut state = ChatPanelState::new();
        let entries: Vec<ChatEntry> = (0..10)
            .map(|i| answered(&format!("question {i}"), &format!("answer {i}")))
            .collect();
        draw(&mut state, &entries, 50, 10);

        state.handle_event(&TuiEvent::ScrollPageUp);
        assert!(!state.stick_to_bottom);

        for _ in 0..200 {
            state.handle_event(&TuiEvent::ScrollDown);
        }
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn oversized_transcript_keeps_newest_turns() {
        let heights = vec![(3, 30_000); 4];
        // Each turn takes 30_004 rows; only the newest two fit.
        assert_eq!(first_laid_out_turn(&heights), 2);
        assert_eq!(first_laid_out_turn(&heights[..2]), 0);

        let huge = vec![(3, u16::MAX), (3, u16::MAX)];
        assert_eq!(first_laid_out_turn(&huge), 1);
    }

    #[test]
    fn transcript_taller_than_scroll_limit_renders_latest_answer() {
        let mut state = ChatPanelState::new();
        let body = "line\n".repeat(250);
        let entries: Vec<ChatEntry> = (0..300)
            .map(|i| answered(&format!("question {i}"), &format!("{body}answer {i}")))
            .collect();

        let text = draw(&mut state, &entries, 24, 12);
        assert!(text.contains("answer 299"));
        assert!(u32::from(state.content_height) <= MAX_CONTENT_HEIGHT);
        assert!(state.content_height > 60_000);
    }

    #[test]
    fn fades_track_transcript() {
        let mut state = ChatPanelState::new();
        let t0 = Instant::now();
        let mut entry = ChatEntry::pending("q".to_string());
        state.observe(std::slice::from_ref(&entry), t0);
        assert!(!state.is_fading(t0));

        entry.is_loading = false;
        entry.response = Some("r".to_string());
        state.observe(std::slice::from_ref(&entry), t0);
        assert!(state.is_fading(t0));
        assert!(!state.reply_visible(entry.id, t0));
        assert!(state.reply_visible(entry.id, t0 + crate::tui::components::response::FADE_IN_DELAY));

        state.observe(&[], t0);
        assert!(state.fades.is_empty());
    }
}
