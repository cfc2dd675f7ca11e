mod grid;
mod widget;
pub(crate) use self::grid::{layout, DayRole, YearMonth};
pub(crate) use self::widget::{cell_at, MonthView, MONTH_HEIGHT, MONTH_WIDTH};
