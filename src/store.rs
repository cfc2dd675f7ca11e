use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::{macros::format_description, Date};

/// Version of the events file format written by [`EventStore::save`]
pub(crate) const FORMAT_VERSION: u32 = 1;

/// Free-text events attached to calendar days.
///
/// A date is only ever present as a key if it has at least one event;
/// removing the last event of a day removes the day.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct EventStore {
    days: BTreeMap<Date, Vec<String>>,
}

impl EventStore {
    pub(crate) fn new() -> EventStore {
        EventStore::default()
    }

    /// Appends `text` to the events of `date`.  Text that is empty after
    /// trimming is rejected and leaves the store unchanged.
    pub(crate) fn add(&mut self, date: Date, text: &str) -> Result<(), StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::EmptyEvent);
        }
        debug!("Adding event {text:?} on {date}");
        self.days.entry(date).or_default().push(text.to_owned());
        Ok(())
    }

    /// Removes the first event of `date` equal to `text`
    pub(crate) fn remove(&mut self, date: Date, text: &str) -> Result<(), StoreError> {
        let not_found = || StoreError::NotFound {
            date,
            text: text.to_owned(),
        };
        let events = self.days.get_mut(&date).ok_or_else(not_found)?;
        let i = events.iter().position(|e| e == text).ok_or_else(not_found)?;
        debug!("Removing event {text:?} on {date}");
        events.remove(i);
        if events.is_empty() {
            self.days.remove(&date);
        }
        Ok(())
    }

    pub(crate) fn list(&self, date: Date) -> &[String] {
        self.days
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn has_events(&self, date: Date) -> bool {
        self.days.contains_key(&date)
    }

    /// Total number of events across all days
    pub(crate) fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Writes the whole store to `path`.  The data is first written to a
    /// sibling temporary file that is then renamed over `path`, so a failed
    /// save leaves any previous file intact.
    pub(crate) fn save(&self, path: &Path) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: path.to_owned(),
            source,
        };
        let doc = EventsFile {
            version: FORMAT_VERSION,
            days: self
                .days
                .iter()
                .map(|(date, events)| DayRecord {
                    date: date.to_string(),
                    events: events.clone(),
                })
                .collect(),
        };
        let mut content = serde_json::to_string_pretty(&doc)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        content.push('\n');
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = temporary_path(path);
        if let Err(e) = fs::write(&tmp, content).and_then(|()| fs::rename(&tmp, path)) {
            // Best effort; the write or rename failure is what gets reported
            let _ = fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        info!(
            "Saved {} events on {} days to {}",
            self.len(),
            self.days.len(),
            path.display()
        );
        Ok(())
    }

    /// Replaces the contents of the store with the events saved at `path`.
    ///
    /// A nonexistent file yields an empty store.  On any error the store is
    /// left empty rather than partially loaded.
    pub(crate) fn load(&mut self, path: &Path) -> Result<(), StoreError> {
        self.days.clear();
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No events file at {}; starting empty", path.display());
                return Ok(());
            }
            Err(source) => {
                warn!("Failed to read events from {}: {source}", path.display());
                return Err(StoreError::Read {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        match decode(&content) {
            Ok(days) => {
                self.days = days;
                info!(
                    "Loaded {} events on {} days from {}",
                    self.len(),
                    self.days.len(),
                    path.display()
                );
                Ok(())
            }
            Err(source) => {
                warn!("Events file {} is corrupt: {source}", path.display());
                Err(StoreError::Corrupt {
                    path: path.to_owned(),
                    source,
                })
            }
        }
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn decode(content: &[u8]) -> Result<BTreeMap<Date, Vec<String>>, FormatError> {
    let probe = serde_json::from_slice::<VersionProbe>(content)?;
    if probe.version != FORMAT_VERSION {
        return Err(FormatError::Version(probe.version));
    }
    let doc = serde_json::from_slice::<EventsFile>(content)?;
    let mut days = BTreeMap::new();
    for DayRecord { date, events } in doc.days {
        let date = Date::parse(&date, format_description!("[year]-[month]-[day]"))
            .map_err(|_| FormatError::Date(date))?;
        if events.is_empty() {
            return Err(FormatError::EmptyDay(date));
        }
        if events.iter().any(|e| e.trim().is_empty()) {
            return Err(FormatError::BlankEvent(date));
        }
        if days.insert(date, events).is_some() {
            return Err(FormatError::DuplicateDate(date));
        }
    }
    Ok(days)
}

/// On-disk layout of the events file:
///
/// ```json
/// {"version": 1, "days": [{"date": "2024-02-29", "events": ["meeting"]}]}
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
struct EventsFile {
    version: u32,
    days: Vec<DayRecord>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
struct DayRecord {
    date: String,
    events: Vec<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
struct VersionProbe {
    version: u32,
}

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("event text is empty")]
    EmptyEvent,
    #[error("no event {text:?} on {date}")]
    NotFound { date: Date, text: String },
    #[error("failed to write events to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read events from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("events file {} is corrupt", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

#[derive(Debug, Error)]
pub(crate) enum FormatError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("unsupported events file version {0}")]
    Version(u32),
    #[error("invalid date {0:?}")]
    Date(String),
    #[error("date {0} has no events")]
    EmptyDay(Date),
    #[error("date {0} has a blank event")]
    BlankEvent(Date),
    #[error("date {0} is listed more than once")]
    DuplicateDate(Date),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::macros::date;

    const D1: Date = date!(2024 - 02 - 29);
    const D2: Date = date!(2024 - 03 - 01);

    fn sample() -> EventStore {
        let mut store = EventStore::new();
        store.add(D1, "meeting").unwrap();
        store.add(D1, "lunch").unwrap();
        store.add(D1, "meeting").unwrap();
        store.add(D2, "dentist").unwrap();
        store
    }

    #[test]
    fn test_add_empty_rejected() {
        let mut store = sample();
        let before = store.clone();
        assert!(matches!(store.add(D1, ""), Err(StoreError::EmptyEvent)));
        assert!(matches!(store.add(D2, "  \t"), Err(StoreError::EmptyEvent)));
        assert_eq!(store, before);
    }

    #[test]
    fn test_add_preserves_order() {
        let mut store = EventStore::new();
        store.add(D1, "meeting").unwrap();
        assert_eq!(store.list(D1), ["meeting"]);
        store.add(D1, "lunch").unwrap();
        assert_eq!(store.list(D1), ["meeting", "lunch"]);
    }

    #[test]
    fn test_list_absent_date() {
        let store = sample();
        assert!(store.list(date!(2024 - 01 - 01)).is_empty());
        assert!(!store.has_events(date!(2024 - 01 - 01)));
        assert_eq!(store.days.keys().copied().collect::<Vec<_>>(), [D1, D2]);
    }

    #[test]
    fn test_remove_first_occurrence() {
        let mut store = sample();
        store.remove(D1, "meeting").unwrap();
        assert_eq!(store.list(D1), ["lunch", "meeting"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_remove_last_event_removes_date() {
        let mut store = EventStore::new();
        store.add(D1, "meeting").unwrap();
        store.remove(D1, "meeting").unwrap();
        assert!(store.list(D1).is_empty());
        assert!(!store.has_events(D1));
        assert!(store.is_empty());
        assert_eq!(store, EventStore::new());
    }

    #[test]
    fn test_remove_missing() {
        let mut store = sample();
        let before = store.clone();
        assert!(matches!(
            store.remove(D2, "meeting"),
            Err(StoreError::NotFound { date, .. }) if date == D2
        ));
        assert!(matches!(
            store.remove(date!(2024 - 01 - 01), "meeting"),
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn test_save_then_load() {
        let tmpdir = tempdir().unwrap();
        let path = tmpdir.path().join("nested").join("events.json");
        let store = sample();
        store.save(&path).unwrap();
        let mut loaded = EventStore::new();
        loaded.load(&path).unwrap();
        assert_eq!(loaded, store);
        assert!(!temporary_path(&path).exists());
    }

    #[test]
    fn test_saved_format() {
        let tmpdir = tempdir().unwrap();
        let path = tmpdir.path().join("events.json");
        let mut store = EventStore::new();
        store.add(D2, "dentist").unwrap();
        store.add(D1, "meeting").unwrap();
        store.save(&path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "version": 1,
                "days": [
                    {"date": "2024-02-29", "events": ["meeting"]},
                    {"date": "2024-03-01", "events": ["dentist"]},
                ],
            })
        );
    }

    #[test]
    fn test_load_nonexistent() {
        let tmpdir = tempdir().unwrap();
        let mut store = sample();
        store.load(&tmpdir.path().join("missing.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_to_unwritable_path() {
        let tmpdir = tempdir().unwrap();
        let blocker = tmpdir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("events.json");
        assert!(matches!(
            sample().save(&path),
            Err(StoreError::Write { .. })
        ));
    }

    #[test]
    fn test_failed_save_removes_temporary_file() {
        let tmpdir = tempdir().unwrap();
        // A non-empty directory cannot be replaced by the renamed file
        let path = tmpdir.path().join("events.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "").unwrap();
        assert!(matches!(
            sample().save(&path),
            Err(StoreError::Write { .. })
        ));
        assert!(!temporary_path(&path).exists());
        assert!(path.join("keep").exists());
    }

    fn load_str(content: &str) -> (EventStore, Result<(), StoreError>) {
        let tmpdir = tempdir().unwrap();
        let path = tmpdir.path().join("events.json");
        fs::write(&path, content).unwrap();
        let mut store = sample();
        let r = store.load(&path);
        (store, r)
    }

    #[test]
    fn test_load_corrupt() {
        for content in [
            "",
            "garbage",
            "{\"version\": 1}",
            "{\"version\": 2, \"days\": []}",
            "{\"version\": 1, \"days\": [{\"date\": \"2023-02-29\", \"events\": [\"x\"]}]}",
            "{\"version\": 1, \"days\": [{\"date\": \"tomorrow\", \"events\": [\"x\"]}]}",
            "{\"version\": 1, \"days\": [{\"date\": \"2024-02-29\", \"events\": []}]}",
            "{\"version\": 1, \"days\": [{\"date\": \"2024-02-29\", \"events\": [\" \"]}]}",
            "{\"version\": 1, \"days\": [], \"extra\": true}",
            "{\"version\": 1, \"days\": [{\"date\": \"2024-02-29\", \"events\": [\"x\"], \"color\": \"red\"}]}",
            concat!(
                "{\"version\": 1, \"days\": [",
                "{\"date\": \"2024-02-29\", \"events\": [\"x\"]},",
                "{\"date\": \"2024-02-29\", \"events\": [\"y\"]}",
                "]}"
            ),
        ] {
            let (store, r) = load_str(content);
            assert!(
                matches!(r, Err(StoreError::Corrupt { .. })),
                "{content:?} should be corrupt"
            );
            assert!(store.is_empty(), "{content:?} left events behind");
        }
    }

    #[test]
    fn test_load_unsupported_version() {
        let (_, r) = load_str("{\"version\": 7, \"entries\": {}}");
        assert!(matches!(
            r,
            Err(StoreError::Corrupt {
                source: FormatError::Version(7),
                ..
            })
        ));
    }

    #[test]
    fn test_load_valid() {
        let (store, r) = load_str(
            r#"{"version": 1, "days": [{"date": "2024-03-01", "events": ["a", "a"]}]}"#,
        );
        r.unwrap();
        assert_eq!(store.list(D2), ["a", "a"]);
        assert_eq!(store.len(), 2);
    }
}
