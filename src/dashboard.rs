use crate::calendar::{MonthView, MONTH_HEIGHT, MONTH_WIDTH};
use crate::controller::RenderModel;
use crate::theme::{BASE_STYLE, DIM_STYLE, MODIFIED_STYLE, STATUS_STYLE};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Paragraph, Widget, Wrap},
};
use time::{macros::format_description, Date};

const STATUS_HINTS: &str = " ?:help  a:add  d:delete  s:save  q:quit ";

/// The whole screen: the month grid on the left, the selected day's events
/// on the right, and a status line at the bottom
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Dashboard<'a> {
    model: &'a RenderModel,
}

impl<'a> Dashboard<'a> {
    pub(crate) fn new(model: &'a RenderModel) -> Dashboard<'a> {
        Dashboard { model }
    }

    fn split(area: Rect) -> [Rect; 3] {
        let [main, status] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        let [month, events] = Layout::horizontal([
            Constraint::Length(MONTH_WIDTH.saturating_add(4)),
            Constraint::Min(0),
        ])
        .areas(main);
        [month, events, status]
    }

    /// Area in which the month grid is drawn when the screen is `area`
    pub(crate) fn month_area(area: Rect) -> Rect {
        let [month, _, _] = Dashboard::split(area);
        let month = month.inner(Margin::new(2, 1));
        Rect {
            height: month.height.min(MONTH_HEIGHT),
            ..month
        }
    }

    fn events_text(&self) -> Text<'a> {
        if self.model.events.is_empty() {
            return Text::from(Line::styled("No events.", DIM_STYLE));
        }
        self.model
            .events
            .iter()
            .enumerate()
            .map(|(i, e)| Line::raw(format!("{}. {e}", i + 1)))
            .collect()
    }

    fn status_line(&self) -> Line<'a> {
        let mut spans = vec![
            Span::styled(STATUS_HINTS, STATUS_STYLE),
            Span::styled(
                format!(" {} ", self.model.events_file.display()),
                STATUS_STYLE,
            ),
        ];
        if self.model.modified {
            spans.push(Span::styled("[modified] ", MODIFIED_STYLE));
        }
        Line::from(spans).style(STATUS_STYLE)
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [_, events_area, status_area] = Dashboard::split(area);
        MonthView::new(self.model).render(Dashboard::month_area(area), buf);
        let block = Block::bordered()
            .title(format!(" {} ", long_date(self.model.selected)))
            .style(BASE_STYLE);
        Paragraph::new(self.events_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(events_area.inner(Margin::new(1, 0)), buf);
        self.status_line().render(status_area, buf);
    }
}

fn long_date(date: Date) -> String {
    date.format(format_description!(
        "[weekday], [month repr:long] [day padding:none], [year]"
    ))
    .unwrap_or_else(|_| date.to_string())
}
