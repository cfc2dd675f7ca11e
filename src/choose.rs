use crate::dialog::{draw_frame, text_width, Modal, Step};
use crate::theme::{dialog::HIGHLIGHT_STYLE, BASE_STYLE};
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Text},
    widgets::{Paragraph, Widget},
};

const MIN_WIDTH: u16 = 30;

const MAX_WIDTH: u16 = 70;

/// A list of options of which the user picks one
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ChoicePrompt {
    title: String,
    options: Vec<String>,
    index: usize,
}

impl ChoicePrompt {
    pub(crate) fn new<S: Into<String>>(title: S, options: Vec<String>) -> ChoicePrompt {
        ChoicePrompt {
            title: title.into(),
            options,
            index: 0,
        }
    }

    pub(crate) fn highlighted(&self) -> Option<&str> {
        self.options.get(self.index).map(String::as_str)
    }

    fn to_text(&self, height: u16) -> Text<'_> {
        // Scroll so that the highlighted option is always visible
        let height = usize::from(height.max(1));
        let first = (self.index + 1).saturating_sub(height);
        self.options
            .iter()
            .enumerate()
            .skip(first)
            .take(height)
            .map(|(i, opt)| {
                let s = format!("{:>2}. {opt}", i + 1);
                if i == self.index {
                    Line::styled(s, HIGHLIGHT_STYLE)
                } else {
                    Line::styled(s, BASE_STYLE)
                }
            })
            .collect()
    }
}

impl Modal for ChoicePrompt {
    type Output = Option<String>;

    fn handle_key(&mut self, key: KeyCode) -> Step<Option<String>> {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(i) = self.index.checked_sub(1) {
                    self.index = i;
                    Step::Continue
                } else {
                    Step::Invalid
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.index + 1 < self.options.len() {
                    self.index += 1;
                    Step::Continue
                } else {
                    Step::Invalid
                }
            }
            KeyCode::Enter => match self.highlighted() {
                Some(opt) => Step::Done(Some(opt.to_owned())),
                None => Step::Done(None),
            },
            KeyCode::Esc | KeyCode::Char('q') => Step::Done(None),
            _ => Step::Invalid,
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let width = self
            .options
            .iter()
            .map(|opt| text_width(opt).saturating_add(4))
            .chain([text_width(&self.title).saturating_add(4), MIN_WIDTH])
            .max()
            .unwrap_or(MIN_WIDTH)
            .min(MAX_WIDTH);
        let rows = u16::try_from(self.options.len()).unwrap_or(u16::MAX);
        let inner = draw_frame(&self.title, width, rows, area, buf);
        Paragraph::new(self.to_text(inner.height))
            .style(BASE_STYLE)
            .render(inner, buf);
    }
}
