use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;
use crate::tui::components::input_box::InputBox;

pub const REPO_WARNING: &str = "Share the repo before I start guessing!";

/// Repository URL field with the missing-repo warning underneath.
pub struct RepoBar<'a> {
    pub input: &'a mut InputBox,
    pub show_warning: bool,
}

impl<'a> RepoBar<'a> {
    pub fn height(&self, width: u16) -> u16 {
        self.input.calculate_height(width) + u16::from(self.show_warning)
    }
}

impl<'a> Component for RepoBar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let input_height = self.input.calculate_height(area.width);
        let [input_area, warning_area] =
            Layout::vertical([Constraint::Length(input_height), Constraint::Fill(1)]).areas(area);

        self.input.render(frame, input_area);

        if self.show_warning {
            let warning = Span::styled(
                format!("⚠ {REPO_WARNING}"),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            );
            frame.render_widget(Paragraph::new(warning), warning_area);
        }
    }
}
