mod app;
mod calendar;
mod choose;
mod config;
mod controller;
mod dashboard;
mod dialog;
mod help;
mod prompt;
mod store;
mod theme;
use crate::app::{App, Screen, TerminalConsole};
use crate::config::Config;
use crate::controller::{CalendarController, LocalClock};
use anyhow::Context;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use flexi_logger::{FileSpec, Logger, LoggerHandle};
use lexopt::{Arg, Parser, ValueExt};
use log::info;
use ratatui::DefaultTerminal;
use std::io;
use std::path::{Path, PathBuf};
use time::{format_description::FormatItem, macros::format_description, Date};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        date: Option<Date>,
        config: Option<PathBuf>,
        events_file: Option<PathBuf>,
        log_file: Option<PathBuf>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut date = None;
        let mut config = None;
        let mut events_file = None;
        let mut log_file = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('c') | Arg::Long("config") => {
                    config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('e') | Arg::Long("events-file") => {
                    events_file = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("log-file") => log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Value(value) if date.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&value, &YMD_FMT) {
                        Ok(d) => date = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            date,
            config,
            events_file,
            log_file,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                date,
                config,
                events_file,
                log_file,
            } => {
                let cfg = Config::load(config.as_deref())?;
                let events_file = cfg.events_file(events_file)?;
                let _logger = match cfg.log_file(log_file) {
                    Some(path) => Some(init_logging(&path, cfg.log_level())?),
                    None => None,
                };
                info!("Using events file {}", events_file.display());
                let mut controller = CalendarController::new(LocalClock, events_file);
                if let Some(date) = date {
                    controller = controller.start_date(date);
                }
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(controller, Screen::new(terminal, TerminalConsole)).run()?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: daycal [options] [YYYY-MM-DD]");
                println!();
                println!("Terminal month calendar with per-day notes");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>       Read configuration from the given file");
                println!("  -e, --events-file <PATH>  Load and save events in the given file");
                println!("  --log-file <PATH>         Write log messages to the given file");
                println!("  -h, --help                Display this help message and exit");
                println!("  -V, --version             Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

/// The terminal belongs to the calendar, so log messages only go to a file
fn init_logging(path: &Path, level: &str) -> anyhow::Result<LoggerHandle> {
    Logger::try_with_env_or_str(level)
        .context("invalid log level")?
        .log_to_file(FileSpec::try_from(path).context("invalid log file path")?)
        .append()
        .start()
        .context("failed to start logger")
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = execute!(io::stdout(), EnableMouseCapture)
        .context("failed to enable mouse capture")
        .and_then(|()| func(terminal));
    let _ = execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();
    r
}
