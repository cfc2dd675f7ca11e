use super::grid::{DayRole, DAYS_IN_WEEK, GRID_ROWS};
use crate::controller::{CellView, RenderModel};
use crate::theme::{day_style, role_style, MONTH_STYLE, WEEKDAY_STYLE};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Text,
    widgets::{Paragraph, Widget},
};

static WEEKDAYS: [&str; DAYS_IN_WEEK] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Number of columns per day of week
const DAY_WIDTH: u16 = 7;

/// Number of columns taken up by a day number and its brackets
const DAY_TEXT_WIDTH: u16 = 4;

/// Width of the grid in columns: six full day columns plus the text of the
/// last one and its event marker
pub(crate) const MONTH_WIDTH: u16 = DAY_WIDTH * 6 + DAY_TEXT_WIDTH + 1;

/// Number of lines taken up by the month label and the blank line below it
const TITLE_LINES: u16 = 2;

/// Number of lines taken up by the weekday header and its rule
const HEADER_LINES: u16 = 2;

const WEEKS_TOP: u16 = TITLE_LINES + HEADER_LINES;

/// Number of lines taken up by each week of the calendar
const WEEK_LINES: u16 = 2;

pub(crate) const MONTH_HEIGHT: u16 = WEEKS_TOP + WEEK_LINES * 6;

const ACS_HLINE: char = '─';

const EVENT_MARKER: char = '•';

/// A month grid drawn from a [`RenderModel`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthView<'a> {
    model: &'a RenderModel,
}

impl<'a> MonthView<'a> {
    pub(crate) fn new(model: &'a RenderModel) -> MonthView<'a> {
        MonthView { model }
    }
}

impl Widget for MonthView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_title(&self.model.month_label);
        canvas.draw_header();
        for (i, cell) in self.model.cells.iter().enumerate() {
            if cell.date.is_some() {
                canvas.draw_day(i / DAYS_IN_WEEK, i % DAYS_IN_WEEK, cell);
            }
        }
    }
}

/// Returns the index of the grid cell drawn at terminal position (`x`, `y`)
/// when the month was rendered in `area`
pub(crate) fn cell_at(area: Rect, x: u16, y: u16) -> Option<usize> {
    let rel_x = x.checked_sub(area.x)?;
    let rel_y = y.checked_sub(area.y)?;
    if rel_x >= area.width.min(MONTH_WIDTH) || rel_y >= area.height {
        return None;
    }
    let col = usize::from(rel_x / DAY_WIDTH);
    let row = usize::from(rel_y.checked_sub(WEEKS_TOP)? / WEEK_LINES);
    (row < GRID_ROWS && col < DAYS_IN_WEEK).then_some(row * DAYS_IN_WEEK + col)
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, label: &str) {
        let width = u16::try_from(label.chars().count()).unwrap_or(u16::MAX);
        let x = MONTH_WIDTH.saturating_sub(width) / 2;
        self.mvprint(0, x, label, Some(MONTH_STYLE));
    }

    fn draw_header(&mut self) {
        for (i, name) in WEEKDAYS.iter().enumerate() {
            let style = WEEKDAY_STYLE.patch(role_style(DayRole::for_column(i)));
            self.mvprint(TITLE_LINES, column_x(i) + 1, name, Some(style));
        }
        self.hline(TITLE_LINES + 1, 0, ACS_HLINE, MONTH_WIDTH);
    }

    fn draw_day(&mut self, row: usize, col: usize, cell: &CellView) {
        let Some(date) = cell.date else {
            return;
        };
        let y = WEEK_LINES
            .saturating_mul(u16::try_from(row).unwrap_or(u16::MAX))
            .saturating_add(WEEKS_TOP);
        let x = column_x(col);
        let s = if cell.is_today {
            format!("[{:2}]", date.day())
        } else {
            format!(" {:2} ", date.day())
        };
        self.mvprint(y, x, s, Some(day_style(cell)));
        if cell.has_events {
            self.mvprint(
                y,
                x + DAY_TEXT_WIDTH,
                EVENT_MARKER.to_string(),
                Some(role_style(cell.role)),
            );
        }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // calendar's area, though we need to be sure that the Rect passed
            // to the Paragraph is entirely within the frame lest a panic
            // result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}

fn column_x(col: usize) -> u16 {
    DAY_WIDTH.saturating_mul(u16::try_from(col).unwrap_or(u16::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{CalendarController, Clock};
    use ratatui::style::Modifier;
    use std::path::PathBuf;
    use time::{macros::date, Date};

    struct FixedClock;

    impl Clock for FixedClock {
        fn today(&self) -> Date {
            date!(2026 - 10 - 19)
        }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        let area = buf.area;
        (area.x..area.x + area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_owned()
    }

    fn render(model: &RenderModel) -> Buffer {
        let area = Rect::new(0, 0, MONTH_WIDTH, MONTH_HEIGHT);
        let mut buffer = Buffer::empty(area);
        MonthView::new(model).render(area, &mut buffer);
        buffer
    }

    #[test]
    fn test_render_october() {
        let mut ctrl = CalendarController::new(FixedClock, PathBuf::from("events.json"));
        ctrl.select_day(date!(2026 - 10 - 20)).unwrap();
        let _ = ctrl.request_add_event("dentist");
        let buffer = render(&ctrl.render_model());
        let rows = (0..MONTH_HEIGHT)
            .map(|y| row_text(&buffer, y))
            .collect::<Vec<_>>();
        assert_eq!(rows[0], format!("{:17}October 2026", ""));
        assert_eq!(rows[3], "─".repeat(usize::from(MONTH_WIDTH)));
        assert_eq!(rows[4], format!("{:30}1      2      3", ""));
        assert_eq!(
            rows[1..],
            [
                "",
                " Su     Mo     Tu     We     Th     Fr     Sa",
                rows[3].as_str(),
                rows[4].as_str(),
                "",
                "  4      5      6      7      8      9     10",
                "",
                " 11     12     13     14     15     16     17",
                "",
                " 18    [19]    20 •   21     22     23     24",
                "",
                " 25     26     27     28     29     30     31",
                "",
                "",
                "",
            ]
        );
        let model = ctrl.render_model();
        assert_eq!(
            buffer[(2, 2)].style().fg,
            role_style(DayRole::Sunday).fg,
            "Sunday header should use the Sunday color"
        );
        let selected = buffer[(16, 10)].style();
        assert_eq!(selected.fg, day_style(&model.cells[23]).fg);
        assert!(selected.add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_render_truncated() {
        let ctrl = CalendarController::new(FixedClock, PathBuf::from("events.json"));
        let area = Rect::new(0, 0, 20, 5);
        let mut buffer = Buffer::empty(area);
        MonthView::new(&ctrl.render_model()).render(area, &mut buffer);
        assert_eq!(row_text(&buffer, 2), " Su     Mo     Tu");
        assert_eq!(row_text(&buffer, 4), "");
    }

    #[test]
    fn test_cell_at() {
        let area = Rect::new(10, 5, MONTH_WIDTH, MONTH_HEIGHT);
        assert_eq!(cell_at(area, 10, 5 + WEEKS_TOP), Some(0));
        assert_eq!(cell_at(area, 16, 5 + WEEKS_TOP + 1), Some(0));
        assert_eq!(cell_at(area, 17, 5 + WEEKS_TOP), Some(1));
        assert_eq!(cell_at(area, 10 + 44, 5 + WEEKS_TOP + 10), Some(41));
        assert_eq!(cell_at(area, 10, 5), None);
        assert_eq!(cell_at(area, 9, 5 + WEEKS_TOP), None);
        assert_eq!(cell_at(area, 10 + MONTH_WIDTH, 5 + WEEKS_TOP), None);
        assert_eq!(cell_at(area, 10, 5 + MONTH_HEIGHT), None);
    }
}
