use crate::dialog::{draw_frame, text_width, Modal, Step};
use crate::theme::{
    dialog::{KEY_HINT_STYLE, UNFILLED_CELL_STYLE},
    BASE_STYLE,
};
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span, Text},
    widgets::Widget,
};

const MIN_WIDTH: u16 = 40;

/*
 * ...........................................
 * .┌─────── New event on 2026-10-19 ───────┐.
 * .│                                       │.
 * .│ Dentist at 3_                         │.
 * .│                                       │.
 * .│       [ENTER] Accept  [ESC] Cancel    │.
 * .└───────────────────────────────────────┘.
 * ...........................................
 */

/// A single-line text input
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct TextPrompt {
    title: String,
    text: String,
}

impl TextPrompt {
    pub(crate) fn new<S: Into<String>>(title: S) -> TextPrompt {
        TextPrompt {
            title: title.into(),
            text: String::new(),
        }
    }

    fn to_text(&self, width: u16) -> Text<'static> {
        // Keep the end of the input, where the cursor is, in view
        let room = usize::from(width.saturating_sub(3));
        let skip = self.text.chars().count().saturating_sub(room);
        let visible = self.text.chars().skip(skip).collect::<String>();
        Text::from_iter([
            Line::styled("", BASE_STYLE),
            Line::from_iter([
                Span::styled(" ", BASE_STYLE),
                Span::styled(visible, BASE_STYLE),
                Span::styled("_", UNFILLED_CELL_STYLE),
            ]),
            Line::styled("", BASE_STYLE),
            Line::from_iter([
                Span::styled("[ENTER]", KEY_HINT_STYLE),
                Span::styled(" Accept  ", BASE_STYLE),
                Span::styled("[ESC]", KEY_HINT_STYLE),
                Span::styled(" Cancel", BASE_STYLE),
            ])
            .centered(),
        ])
    }
}

impl Modal for TextPrompt {
    type Output = Option<String>;

    fn handle_key(&mut self, key: KeyCode) -> Step<Option<String>> {
        match key {
            KeyCode::Char(c) => {
                self.text.push(c);
                Step::Continue
            }
            KeyCode::Backspace => {
                if self.text.pop().is_some() {
                    Step::Continue
                } else {
                    Step::Invalid
                }
            }
            KeyCode::Enter => Step::Done(Some(std::mem::take(&mut self.text))),
            KeyCode::Esc => Step::Done(None),
            _ => Step::Invalid,
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let width = text_width(&self.title).saturating_add(4).max(MIN_WIDTH);
        let inner = draw_frame(&self.title, width, 4, area, buf);
        self.to_text(inner.width).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(prompt: &mut TextPrompt, s: &str) {
        for c in s.chars() {
            assert_eq!(prompt.handle_key(KeyCode::Char(c)), Step::Continue);
        }
    }

    #[test]
    fn test_type_and_accept() {
        let mut prompt = TextPrompt::new("New event");
        type_str(&mut prompt, "dentisy");
        assert_eq!(prompt.handle_key(KeyCode::Backspace), Step::Continue);
        type_str(&mut prompt, "t at 3");
        assert_eq!(prompt.text, "dentist at 3");
        assert_eq!(
            prompt.handle_key(KeyCode::Enter),
            Step::Done(Some(String::from("dentist at 3")))
        );
    }

    #[test]
    fn test_cancel() {
        let mut prompt = TextPrompt::new("New event");
        type_str(&mut prompt, "abc");
        assert_eq!(prompt.handle_key(KeyCode::Esc), Step::Done(None));
    }

    #[test]
    fn test_invalid_keys() {
        let mut prompt = TextPrompt::new("New event");
        assert_eq!(prompt.handle_key(KeyCode::Backspace), Step::Invalid);
        assert_eq!(prompt.handle_key(KeyCode::F(1)), Step::Invalid);
        assert_eq!(prompt.handle_key(KeyCode::Enter), Step::Done(Some(String::new())));
    }

    #[test]
    fn test_render() {
        let area = Rect::new(0, 0, 60, 10);
        let mut buffer = Buffer::empty(area);
        let mut prompt = TextPrompt::new("New event on 2026-10-19");
        type_str(&mut prompt, "lunch");
        prompt.render(area, &mut buffer);
        // The box spans columns 8 to 51 and its border sits one column in
        let line = |y: u16| {
            (10..50)
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        };
        assert_eq!(buffer[(8, 2)].symbol(), " ");
        assert_eq!(buffer[(9, 2)].symbol(), "┌");
        assert_eq!(line(4), format!("{:40}", " lunch_"));
        assert!(line(6).contains("[ENTER] Accept  [ESC] Cancel"));
    }

    #[test]
    fn test_render_long_input_shows_end() {
        let mut prompt = TextPrompt::new("x");
        type_str(&mut prompt, &"a".repeat(50));
        type_str(&mut prompt, "END");
        let text = prompt.to_text(20);
        let shown = text.lines[1]
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect::<String>();
        assert_eq!(shown, format!(" {}END_", "a".repeat(14)));
    }
}
