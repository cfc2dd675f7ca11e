use crate::theme::BASE_STYLE;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Widget, Wrap},
};

/// Outcome of feeding one key press to a [`Modal`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Step<T> {
    /// The key was accepted and the dialog stays open
    Continue,
    /// The key does nothing in this dialog
    Invalid,
    Done(T),
}

/// A dialog drawn over the calendar that consumes key presses until it
/// produces an output
pub(crate) trait Modal {
    type Output;

    fn handle_key(&mut self, key: KeyCode) -> Step<Self::Output>;

    fn render(&self, area: Rect, buf: &mut Buffer);
}

/// Clears a box of the given inner size centered in `area`, draws a titled
/// border around it, and returns the area inside the border.  A one-column
/// margin of blank space is kept on either side of the border.
pub(crate) fn draw_frame(title: &str, width: u16, height: u16, area: Rect, buf: &mut Buffer) -> Rect {
    let width = width.saturating_add(4).min(area.width);
    let height = height.saturating_add(2).min(area.height);
    let [outer_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
    let [outer_area] = Layout::vertical([height])
        .flex(Flex::Center)
        .areas(outer_area);
    Clear.render(outer_area, buf);
    Block::new().style(BASE_STYLE).render(outer_area, buf);
    let block_area = outer_area.inner(Margin::new(1, 0));
    let block = Block::bordered()
        .title(format!(" {title} "))
        .title_alignment(Alignment::Center)
        .style(BASE_STYLE);
    let inner = block.inner(block_area);
    block.render(block_area, buf);
    inner
}

pub(crate) fn text_width(s: &str) -> u16 {
    u16::try_from(Line::raw(s).width()).unwrap_or(u16::MAX)
}

/// A message shown until any key is pressed
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Notice {
    message: String,
}

impl Notice {
    const DISMISS: &'static str = "Press any key to continue.";

    const MAX_WIDTH: u16 = 60;

    pub(crate) fn new<S: Into<String>>(message: S) -> Notice {
        Notice {
            message: message.into(),
        }
    }
}

impl Modal for Notice {
    type Output = ();

    fn handle_key(&mut self, _key: KeyCode) -> Step<()> {
        Step::Done(())
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let width = text_width(&self.message)
            .max(text_width(Self::DISMISS))
            .min(Self::MAX_WIDTH);
        let message_lines = text_width(&self.message).div_ceil(width.max(1)).max(1);
        let text = Text::from_iter([
            Line::raw(self.message.as_str()),
            Line::raw(""),
            Line::raw(Self::DISMISS),
        ]);
        let inner = draw_frame("Notice", width, message_lines + 2, area, buf);
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .style(BASE_STYLE)
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_dismissed_by_any_key() {
        let mut notice = Notice::new("Saved");
        assert_eq!(notice.handle_key(KeyCode::Char('x')), Step::Done(()));
        assert_eq!(notice.handle_key(KeyCode::Esc), Step::Done(()));
    }

    #[test]
    fn test_notice_render() {
        let area = Rect::new(0, 0, 40, 7);
        let mut buffer = Buffer::empty(area);
        Notice::new("Saved events").render(area, &mut buffer);
        assert_eq!(buffer[(6, 1)].symbol(), "┌");
        assert_eq!(buffer[(33, 5)].symbol(), "┘");
        assert_eq!(buffer[(5, 2)].symbol(), " ");
        let line = |y: u16| (7..33).map(|x| buffer[(x, y)].symbol()).collect::<String>();
        assert_eq!(line(2), format!("{:26}", "Saved events"));
        assert_eq!(line(3), " ".repeat(26));
        assert_eq!(line(4), "Press any key to continue.");
    }
}
