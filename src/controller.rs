use crate::calendar::{layout, DayRole, YearMonth};
use crate::store::{EventStore, StoreError};
use log::{debug, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::{Date, OffsetDateTime};

/// Source of the current date
pub(crate) trait Clock {
    fn today(&self) -> Date;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> Date {
        match OffsetDateTime::now_local() {
            Ok(now) => now.date(),
            Err(e) => {
                warn!("Could not determine local date, using UTC: {e}");
                OffsetDateTime::now_utc().date()
            }
        }
    }
}

/// The capabilities the controller needs from whatever displays the
/// calendar.  Errors are failures of the display itself and are not
/// recoverable.
pub(crate) trait View {
    fn render(&mut self, model: &RenderModel) -> io::Result<()>;

    /// Asks the user for a line of text; `None` if they cancelled
    fn prompt_text(&mut self, title: &str) -> io::Result<Option<String>>;

    /// Asks the user to pick one of `options`; `None` if they cancelled
    fn prompt_choice(&mut self, title: &str, options: &[String]) -> io::Result<Option<String>>;

    fn notify(&mut self, message: &str) -> io::Result<()>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Command {
    PreviousMonth,
    NextMonth,
    Today,
    Select(Date),
    AddEvent,
    DeleteEvent,
    Save,
    Load,
}

/// Result of a request that may leave the store as it was
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Edit {
    Changed,
    Unchanged,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Delete {
    Deleted,
    NothingToDelete,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CellView {
    pub(crate) date: Option<Date>,
    pub(crate) is_today: bool,
    pub(crate) is_selected: bool,
    pub(crate) has_events: bool,
    pub(crate) role: DayRole,
}

/// Read-only snapshot of everything the view displays
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct RenderModel {
    pub(crate) month_label: String,
    pub(crate) cells: Vec<CellView>,
    pub(crate) selected: Date,
    pub(crate) events: Vec<String>,
    pub(crate) events_file: PathBuf,
    pub(crate) modified: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalendarController<C> {
    clock: C,
    today: Date,
    current_month: YearMonth,
    selected: Date,
    store: EventStore,
    events_file: PathBuf,
    modified: bool,
}

impl<C: Clock> CalendarController<C> {
    pub(crate) fn new(clock: C, events_file: PathBuf) -> Self {
        let today = clock.today();
        CalendarController {
            clock,
            today,
            current_month: YearMonth::containing(today),
            selected: today,
            store: EventStore::new(),
            events_file,
            modified: false,
        }
    }

    /// Opens the calendar on the month of `date` with `date` selected
    pub(crate) fn start_date(mut self, date: Date) -> Self {
        self.current_month = YearMonth::containing(date);
        self.selected = date;
        self
    }

    pub(crate) fn selected(&self) -> Date {
        self.selected
    }

    pub(crate) fn events_file(&self) -> &Path {
        &self.events_file
    }

    pub(crate) fn is_modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn go_to_previous_month(&mut self) -> Result<(), OutOfTimeError> {
        self.current_month = self.current_month.previous().ok_or(OutOfTimeError)?;
        debug!("Showing {}", self.current_month);
        Ok(())
    }

    pub(crate) fn go_to_next_month(&mut self) -> Result<(), OutOfTimeError> {
        self.current_month = self.current_month.next().ok_or(OutOfTimeError)?;
        debug!("Showing {}", self.current_month);
        Ok(())
    }

    pub(crate) fn go_to_today(&mut self) {
        self.today = self.clock.today();
        self.current_month = YearMonth::containing(self.today);
        self.selected = self.today;
        debug!("Jumped to today, {}", self.today);
    }

    /// Selects a day of the month currently shown
    pub(crate) fn select_day(&mut self, date: Date) -> Result<(), OutsideMonthError> {
        if !self.current_month.contains(date) {
            return Err(OutsideMonthError {
                date,
                month: self.current_month,
            });
        }
        self.selected = date;
        Ok(())
    }

    /// Adds an event to the selected day.  Blank text is ignored.
    pub(crate) fn request_add_event(&mut self, text: &str) -> Edit {
        match self.store.add(self.selected, text) {
            Ok(()) => {
                self.modified = true;
                Edit::Changed
            }
            Err(_) => {
                debug!("Ignoring blank event for {}", self.selected);
                Edit::Unchanged
            }
        }
    }

    pub(crate) fn request_delete_event(&mut self, text: &str) -> Result<Delete, StoreError> {
        if self.store.list(self.selected).is_empty() {
            return Ok(Delete::NothingToDelete);
        }
        self.store.remove(self.selected, text)?;
        self.modified = true;
        Ok(Delete::Deleted)
    }

    pub(crate) fn request_save(&mut self) -> Result<(), StoreError> {
        self.store.save(&self.events_file)?;
        self.modified = false;
        Ok(())
    }

    /// Reloads the store from the events file, discarding unsaved changes.
    /// On failure the store is left empty.
    pub(crate) fn request_load(&mut self) -> Result<(), StoreError> {
        self.modified = false;
        self.store.load(&self.events_file)
    }

    pub(crate) fn render_model(&self) -> RenderModel {
        let cells = layout(self.current_month)
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let date = cell.date();
                CellView {
                    date,
                    is_today: date == Some(self.today),
                    is_selected: date == Some(self.selected),
                    has_events: date.is_some_and(|d| self.store.has_events(d)),
                    role: DayRole::for_column(i),
                }
            })
            .collect();
        RenderModel {
            month_label: self.current_month.to_string(),
            cells,
            selected: self.selected,
            events: self.store.list(self.selected).to_vec(),
            events_file: self.events_file.clone(),
            modified: self.modified,
        }
    }

    /// Loads the events file and draws the initial screen.  A failed load
    /// is reported to the user and leaves the calendar empty.
    pub(crate) fn start<V: View>(&mut self, view: &mut V) -> io::Result<()> {
        let notice = self
            .request_load()
            .err()
            .map(|e| failure_message("Could not load events", e));
        view.render(&self.render_model())?;
        if let Some(msg) = notice {
            view.notify(&msg)?;
        }
        Ok(())
    }

    /// Carries out `command`, prompting and notifying through `view` as
    /// needed, and re-renders.  Returns `false` if the command could not be
    /// carried out because it would move outside the calendar or the
    /// displayed month.
    pub(crate) fn dispatch<V: View>(&mut self, command: Command, view: &mut V) -> io::Result<bool> {
        debug!("Dispatching {command:?}");
        let mut notice = None;
        let accepted = match command {
            Command::PreviousMonth => self.go_to_previous_month().is_ok(),
            Command::NextMonth => self.go_to_next_month().is_ok(),
            Command::Today => {
                self.go_to_today();
                true
            }
            Command::Select(date) => match self.select_day(date) {
                Ok(()) => true,
                Err(e) => {
                    debug!("{e}");
                    false
                }
            },
            Command::AddEvent => {
                let title = format!("New event on {}", self.selected);
                if let Some(text) = view.prompt_text(&title)? {
                    match self.request_add_event(&text) {
                        Edit::Changed => info!("Added an event on {}", self.selected),
                        Edit::Unchanged => debug!("Nothing added on {}", self.selected),
                    }
                }
                true
            }
            Command::DeleteEvent => {
                notice = self.prompt_delete(view)?;
                true
            }
            Command::Save => {
                notice = Some(match self.request_save() {
                    Ok(()) => format!("Saved events to {}", self.events_file.display()),
                    Err(e) => failure_message("Save failed", e),
                });
                true
            }
            Command::Load => {
                notice = Some(match self.request_load() {
                    Ok(()) if self.store.is_empty() => {
                        format!("No events in {}", self.events_file.display())
                    }
                    Ok(()) => format!(
                        "Loaded {} from {}",
                        count_events(self.store.len()),
                        self.events_file.display()
                    ),
                    Err(e) => failure_message("Load failed", e),
                });
                true
            }
        };
        view.render(&self.render_model())?;
        if let Some(msg) = notice {
            view.notify(&msg)?;
        }
        Ok(accepted)
    }

    fn prompt_delete<V: View>(&mut self, view: &mut V) -> io::Result<Option<String>> {
        let events = self.store.list(self.selected).to_vec();
        if events.is_empty() {
            return Ok(Some(String::from("Nothing to delete.")));
        }
        let title = format!("Delete event on {}", self.selected);
        let Some(choice) = view.prompt_choice(&title, &events)? else {
            return Ok(None);
        };
        match self.request_delete_event(&choice) {
            Ok(Delete::Deleted) => Ok(None),
            Ok(Delete::NothingToDelete) => Ok(Some(String::from("Nothing to delete."))),
            Err(e) => Ok(Some(failure_message("Delete failed", e))),
        }
    }
}

fn count_events(n: usize) -> String {
    if n == 1 {
        String::from("1 event")
    } else {
        format!("{n} events")
    }
}

fn failure_message(context: &str, e: StoreError) -> String {
    info!("{context}: {e}");
    let e = anyhow::Error::new(e);
    format!("{context}: {e:#}")
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("{date} is not in {month}")]
pub(crate) struct OutsideMonthError {
    date: Date,
    month: YearMonth,
}
