use crate::calendar::DayRole;
use crate::controller::CellView;
use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const MONTH_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const SUNDAY_STYLE: Style = Style::new().fg(Color::LightRed);

pub(crate) const SATURDAY_STYLE: Style = Style::new().fg(Color::LightBlue);

pub(crate) const HAS_EVENTS_STYLE: Style = Style::new()
    .fg(Color::LightGreen)
    .add_modifier(Modifier::BOLD);

pub(crate) const SELECTED_STYLE: Style = Style::new().add_modifier(Modifier::REVERSED);

pub(crate) const DIM_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const STATUS_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Gray);

pub(crate) const MODIFIED_STYLE: Style = STATUS_STYLE.add_modifier(Modifier::BOLD);

pub(crate) fn role_style(role: DayRole) -> Style {
    match role {
        DayRole::Weekday => Style::new(),
        DayRole::Saturday => SATURDAY_STYLE,
        DayRole::Sunday => SUNDAY_STYLE,
    }
}

/// Style of a day number in the month grid.  Weekend colors take precedence
/// over the color of days with events, which still show in bold.
pub(crate) fn day_style(cell: &CellView) -> Style {
    let mut style = BASE_STYLE;
    if cell.has_events {
        style = style.patch(HAS_EVENTS_STYLE);
    }
    style = style.patch(role_style(cell.role));
    if cell.is_selected {
        style = style.patch(SELECTED_STYLE);
    }
    style
}

pub(crate) mod dialog {
    use super::*;

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const HIGHLIGHT_STYLE: Style = BASE_STYLE.add_modifier(Modifier::REVERSED);

    pub(crate) const KEY_HINT_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}
