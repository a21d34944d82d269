//! Configuration management for the inspect tool.

use std::env;
use std::path::{Path, PathBuf};

/// Encoding of a saved catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    /// Guess the encoding from a file extension: `.json` is JSON, anything
    /// else is the text format.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Text,
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            _ => Err(ConfigError::InvalidFormat(value.to_string())),
        }
    }
}

/// Which report to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Library,
    Catalog,
    Ratings,
    Stats,
    All,
}

impl Report {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "library" => Ok(Report::Library),
            "catalog" => Ok(Report::Catalog),
            "ratings" => Ok(Report::Ratings),
            "stats" => Ok(Report::Stats),
            "all" => Ok(Report::All),
            _ => Err(ConfigError::InvalidReport(value.to_string())),
        }
    }
}

/// Tool configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Saved catalog to load
    pub data_file: PathBuf,
    /// Encoding of `data_file`
    pub format: Format,
    /// Report to print
    pub report: Report,
    /// Where to write the loaded state back out, if anywhere
    pub export: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_file = lookup("SHELF_DATA_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingDataFile)?;

        let format = match lookup("SHELF_FORMAT") {
            Some(value) => Format::parse(&value)?,
            None => Format::for_path(&data_file),
        };

        let report = match lookup("SHELF_REPORT") {
            Some(value) => Report::parse(&value)?,
            None => Report::All,
        };

        let export = lookup("SHELF_EXPORT")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            data_file,
            format,
            report,
            export,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SHELF_DATA_FILE environment variable is required")]
    MissingDataFile,

    #[error("Invalid SHELF_FORMAT value: {0}")]
    InvalidFormat(String),

    #[error("Invalid SHELF_REPORT value: {0}")]
    InvalidReport(String),
}
