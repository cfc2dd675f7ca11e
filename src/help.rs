use crate::dialog::{draw_frame, Modal, Step};
use crate::theme::BASE_STYLE;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Text},
    widgets::{Paragraph, Widget},
};

static TEXT: &[&str] = &[
    "h, LEFT          Select previous day",
    "l, RIGHT         Select next day",
    "k, UP            Select same day last week",
    "j, DOWN          Select same day next week",
    "p, <, PAGE UP    Show previous month",
    "n, >, PAGE DOWN  Show next month",
    "t, HOME          Jump to today",
    "a, ENTER         Add an event to the selected day",
    "d, DELETE        Delete an event from the selected day",
    "s                Save events",
    "r                Reload events, discarding changes",
    "?                Show this help",
    "q, ESC           Quit",
    "",
    "Click on a day to select it.",
    "Press the Any Key to dismiss.",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help;

impl Modal for Help {
    type Output = ();

    fn handle_key(&mut self, _key: KeyCode) -> Step<()> {
        Step::Done(())
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let text = TEXT.iter().map(|&s| Line::raw(s)).collect::<Text<'_>>();
        let height = u16::try_from(text.height()).unwrap_or(u16::MAX);
        let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
        let inner = draw_frame("Commands", width, height, area, buf);
        Paragraph::new(text).style(BASE_STYLE).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_render() {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        Help.render(area, &mut buffer);
        let row = |y: u16| {
            (0..80)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
                .trim()
                .to_owned()
        };
        assert!(row(3).contains("Commands"), "{:?}", row(3));
        assert_eq!(row(4), format!("│{:54}│", TEXT[0]));
        assert_eq!(row(19), format!("│{:54}│", TEXT[15]));
    }
}
