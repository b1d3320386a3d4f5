//! # Loader Component
//!
//! Full-screen indicator shown until the first status poll settles.
//!
//! Four messages, 2 s each: a message is shown for 1.6 s, then dims for the
//! remaining 0.4 s before the next one. The last message holds, undimmed.

use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::rotation::{AtEnd, Rotation};
use crate::tui::component::Component;

pub const LOADER_MESSAGES: &[&str] = &[
    "Pinging the LLM... making sure it's awake 😴",
    "Checking backend vibes... one sec ⚙️",
    "Lining up the last few wires... 🧠",
    "Almost there! Don't rage quit yet 😎",
];

pub const LOADER_STEP: Duration = Duration::from_millis(2000);
/// Time within each step the message is fully visible.
pub const LOADER_VISIBLE: Duration = Duration::from_millis(1600);

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAME_TIME: Duration = Duration::from_millis(80);

/// Braille spinner frame for `elapsed` time since some fixed origin.
pub fn spinner_at(elapsed: Duration) -> &'static str {
    let frame = elapsed.as_millis() / SPINNER_FRAME_TIME.as_millis();
    SPINNER_FRAMES[(frame % SPINNER_FRAMES.len() as u128) as usize]
}

/// Rotation driving the loader messages.
pub fn loader_rotation() -> Rotation {
    Rotation::new(LOADER_MESSAGES.len(), LOADER_STEP, AtEnd::Hold)
}

/// Whether the current loader message is in its fade-out window.
pub fn is_fading(rotation: &Rotation, now: Instant) -> bool {
    !rotation.is_at_end(now) && rotation.phase_at(now) >= LOADER_VISIBLE
}

pub struct Loader<'a> {
    pub rotation: &'a Rotation,
    pub now: Instant,
    pub spinner: &'a str,
}

impl<'a> Component for Loader<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [_, title_row, _, message_row, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!("{} ", self.spinner), Style::default().fg(Color::Cyan)),
                Span::styled(
                    "CodeLens",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            ]))
            .alignment(Alignment::Center),
            title_row,
        );

        let mut style = Style::default().fg(Color::Gray);
        if is_fading(self.rotation, self.now) {
            style = style.add_modifier(Modifier::DIM);
        }
        let message = LOADER_MESSAGES[self.rotation.index_at(self.now)];
        frame.render_widget(
            Paragraph::new(Span::styled(message, style)).alignment(Alignment::Center),
            message_row,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn draw(rotation: &Rotation, now: Instant) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal
            .draw(|f| {
                Loader {
                    rotation,
                    now,
                    spinner: spinner_at(Duration::ZERO),
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
    fn messages_advance_and_hold() {
        let mut rotation = loader_rotation();
        let t0 = Instant::now();
        rotation.start(t0);

        assert!(draw(&rotation, t0).contains("Pinging the LLM"));
        assert!(draw(&rotation, t0 + ms(2000)).contains("Checking backend vibes"));
        assert!(draw(&rotation, t0 + ms(4500)).contains("Lining up the last few wires"));
        assert!(draw(&rotation, t0 + ms(60_000)).contains("Almost there!"));
    }

    #[test]
    fn message_dims_after_visible_window() {
        let mut rotation = loader_rotation();
        let t0 = Instant::now();
        rotation.start(t0);

        assert!(!is_fading(&rotation, t0 + ms(1599)));
        assert!(is_fading(&rotation, t0 + ms(1600)));
        assert!(!is_fading(&rotation, t0 + ms(2000)));
    }

    #[test]
    fn last_message_never_fades() {
        let mut rotation = loader_rotation();
        let t0 = Instant::now();
        rotation.start(t0);
        assert!(!is_fading(&rotation, t0 + ms(7900)));
        assert!(!is_fading(&rotation, t0 + ms(61_900)));
    }

    #[test]
    fn spinner_cycles() {
        assert_eq!(spinner_at(Duration::ZERO), SPINNER_FRAMES[0]);
        assert_eq!(spinner_at(ms(80)), SPINNER_FRAMES[1]);
        assert_eq!(spinner_at(ms(800)), SPINNER_FRAMES[0]);
    }
}
