use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "daycal";

const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
    "debug"
} else {
    "info"
};

/// Settings read from `config.toml`.  Every key is optional.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) events_file: Option<PathBuf>,
    pub(crate) log_file: Option<PathBuf>,
    pub(crate) log_level: Option<String>,
}

impl Config {
    /// Reads the configuration from `path` if given, which must then exist,
    /// or else from the default location, which may be absent
    pub(crate) fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(p) => Config::from_file(p),
            None => match Config::default_path() {
                Some(p) if p.exists() => Config::from_file(&p),
                _ => Ok(Config::default()),
            },
        }
    }

    pub(crate) fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Picks the events file: the command line wins over the configuration
    /// file, which wins over the per-user data directory
    pub(crate) fn events_file(&self, cli: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        if let Some(p) = cli.or_else(|| self.events_file.clone()) {
            return Ok(p);
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR).join("events.json"))
            .ok_or(ConfigError::NoDataDir)
    }

    pub(crate) fn log_file(&self, cli: Option<PathBuf>) -> Option<PathBuf> {
        cli.or_else(|| self.log_file.clone())
    }

    pub(crate) fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not determine the data directory; use --events-file")]
    NoDataDir,
}
