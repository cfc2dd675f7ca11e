use std::fmt;
use std::iter::successors;
use time::{Date, Duration, Month, Weekday};

pub(crate) const DAYS_IN_WEEK: usize = 7;

pub(crate) const GRID_ROWS: usize = 6;

/// Number of cells in a month grid: six weeks of seven days, enough for a
/// 31-day month whose first day falls on a Saturday
pub(crate) const GRID_CELLS: usize = GRID_ROWS * DAYS_IN_WEEK;

pub(crate) trait WeekdayExt {
    /// Column of the weekday in a Sunday-first week
    fn index0(&self) -> usize;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> usize {
        self.number_days_from_sunday().into()
    }
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    time::util::is_leap_year(year)
}

pub(crate) fn length_of_month(year: i32, month: Month) -> u8 {
    time::util::days_in_month(month, year)
}

/// A calendar month, stored as the date of its first day
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct YearMonth(Date);

impl YearMonth {
    pub(crate) fn containing(date: Date) -> YearMonth {
        let offset = Duration::days(i64::from(date.day()) - 1);
        YearMonth(date.saturating_sub(offset))
    }

    pub(crate) fn year(&self) -> i32 {
        self.0.year()
    }

    pub(crate) fn month(&self) -> Month {
        self.0.month()
    }

    pub(crate) fn first_day(&self) -> Date {
        self.0
    }

    pub(crate) fn last_day(&self) -> Date {
        let offset = Duration::days(i64::from(self.length()) - 1);
        self.0.saturating_add(offset)
    }

    pub(crate) fn length(&self) -> u8 {
        length_of_month(self.year(), self.month())
    }

    pub(crate) fn contains(&self, date: Date) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Returns `None` if the month is the first representable one
    pub(crate) fn previous(&self) -> Option<YearMonth> {
        self.0.previous_day().map(YearMonth::containing)
    }

    /// Returns `None` if the month is the last representable one
    pub(crate) fn next(&self) -> Option<YearMonth> {
        self.last_day().next_day().map(YearMonth)
    }

    pub(crate) fn days(&self) -> impl Iterator<Item = Date> {
        successors(Some(self.0), |d| d.next_day()).take(self.length().into())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month(), self.year())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Cell {
    Empty,
    Day(Date),
}

impl Cell {
    pub(crate) fn date(&self) -> Option<Date> {
        match self {
            Cell::Empty => None,
            Cell::Day(date) => Some(*date),
        }
    }
}

/// Lays out `month` in a Sunday-first grid of [`GRID_CELLS`] cells: blank
/// cells up to the weekday of the 1st, then every day of the month in order,
/// then blank cells to fill the grid.
pub(crate) fn layout(month: YearMonth) -> [Cell; GRID_CELLS] {
    let mut cells = [Cell::Empty; GRID_CELLS];
    let offset = month.first_day().weekday().index0();
    for (cell, date) in cells.iter_mut().skip(offset).zip(month.days()) {
        *cell = Cell::Day(date);
    }
    cells
}

/// Weekday role of the given grid column, used for weekend coloring
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum DayRole {
    Weekday,
    Saturday,
    Sunday,
}

impl DayRole {
    pub(crate) fn for_column(column: usize) -> DayRole {
        match column % DAYS_IN_WEEK {
            0 => DayRole::Sunday,
            6 => DayRole::Saturday,
            _ => DayRole::Weekday,
        }
    }
}
