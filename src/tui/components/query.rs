use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

/// Horizontal padding (per side) between the border and the text.
const CONTENT_PAD_H: u16 = 1;
/// Borders (2) plus padding on both sides.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
const VERTICAL_OVERHEAD: u16 = 2;
/// Outgoing bubbles never take more than this share of the row, in percent.
const MAX_WIDTH_PERCENT: u32 = 80;
/// Narrowest bubble worth drawing before falling back to the full width.
const MIN_BUBBLE_WIDTH: u16 = 16;

pub(crate) fn wrap_options(width: usize) -> textwrap::Options<'static> {
    textwrap::Options::new(width.max(1))
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// The user's side of a chat turn: a right-aligned outgoing bubble.
///
/// Transient and stateless, like every chat renderer. Whitespace-only text
/// renders nothing and takes no space.
#[derive(Clone, Copy)]
pub struct Query<'a> {
    pub text: &'a str,
}

impl<'a> Query<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    fn content(&self) -> &'a str {
        self.text.trim()
    }

    fn max_bubble_width(width: u16) -> u16 {
        let preferred = (u32::from(width) * MAX_WIDTH_PERCENT / 100) as u16;
        if preferred < MIN_BUBBLE_WIDTH {
            width
        } else {
            preferred
        }
    }

    /// Wrapped lines and outer bubble width for a row of `width` columns.
    fn layout(&self, width: u16) -> (Vec<String>, u16) {
        let max_width = Self::max_bubble_width(width);
        let text_width = max_width.saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        let lines: Vec<String> = textwrap::wrap(self.content(), wrap_options(text_width))
            .into_iter()
            .map(|l| l.into_owned())
            .collect();
        let longest = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
        let bubble = (longest + HORIZONTAL_OVERHEAD).min(max_width);
        (lines, bubble)
    }

    /// Rows this bubble occupies at `width`; zero when there is nothing to show.
    pub fn calculate_height(text: &str, width: u16) -> u16 {
        let query = Query::new(text);
        if query.content().is_empty() {
            return 0;
        }
        if width <= HORIZONTAL_OVERHEAD {
            return 1;
        }
        let (lines, _) = query.layout(width);
        u16::try_from(lines.len())
            .unwrap_or(u16::MAX)
            .max(1)
            .saturating_add(VERTICAL_OVERHEAD)
    }
}

impl<'a> Widget for Query<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.content().is_empty() || area.width <= HORIZONTAL_OVERHEAD {
            return;
        }

        let (lines, bubble_width) = self.layout(area.width);
        let bubble = Rect {
            x: area.x + area.width - bubble_width,
            width: bubble_width,
            ..area
        };

        let style = Style::default().fg(Color::Green);
        let block = Block::bordered()
            .title_top(Line::from("you").right_aligned())
            .border_type(BorderType::Rounded)
            .border_style(style.add_modifier(Modifier::DIM))
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner = block.inner(bubble);
        block.render(bubble, buf);

        let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
        Paragraph::new(text).style(style).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_rows(query: Query, width: u16) -> Vec<String> {
        let height = Query::calculate_height(query.text, width).max(1);
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        query.render(area, &mut buf);
        (0..height)
            .map(|y| (0..width).map(|x| buf[(x, y)].symbol()).collect())
            .collect()
    }

    #[test]
    fn empty_and_whitespace_render_nothing() {
        assert_eq!(Query::calculate_height("", 40), 0);
        assert_eq!(Query::calculate_height("  \n\t ", 40), 0);

        let rows = render_to_rows(Query::new("   "), 40);
        assert!(rows.iter().all(|r| r.trim().is_empty()));
    }

    #[test]
    fn short_query_is_single_line_bubble() {
        assert_eq!(Query::calculate_height("what does main.py do?", 60), 3);
    }

    #[test]
    fn long_query_wraps() {
        let text = "word ".repeat(40);
        assert!(Query::calculate_height(&text, 40) > 3);
    }

    #[test]
    fn bubble_is_right_aligned_and_trimmed() {
        let rows = render_to_rows(Query::new("  hi there  "), 40);
        let middle = &rows[1];
        assert!(middle.contains("hi there"));
        assert!(middle.starts_with(' '), "left side stays empty");
        assert!(middle.trim_end().ends_with('│'), "bubble touches the right edge");
    }

    #[test]
    fn narrow_rows_use_full_width() {
        assert_eq!(Query::max_bubble_width(10), 10);
        assert_eq!(Query::max_bubble_width(100), 80);
    }

    #[test]
    fn very_wide_rows_keep_the_bubble_share() {
        assert_eq!(Query::max_bubble_width(1000), 800);
        assert_eq!(Query::max_bubble_width(u16::MAX), 52_428);
        assert_eq!(Query::calculate_height("hello", 2000), 3);
    }
}
