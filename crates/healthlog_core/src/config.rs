//! Process configuration resolved from `HEALTHLOG_*` environment variables.
//!
//! # Invariants
//! - Every field has a usable default; an empty environment is valid.
//! - Blank values are treated as unset.
//! - Paths are taken as given; existence is checked by their consumers.

use crate::logging::default_log_level;
use crate::reminder::DEFAULT_TOLERANCE_MINUTES;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "HEALTHLOG_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "HEALTHLOG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "HEALTHLOG_LOG_DIR";
pub const ENV_REMINDER_TOLERANCE: &str = "HEALTHLOG_REMINDER_TOLERANCE_MINUTES";
pub const ENV_INTERACTIONS_PATH: &str = "HEALTHLOG_INTERACTIONS_PATH";
pub const ENV_MED_INFO_PATH: &str = "HEALTHLOG_MED_INFO_PATH";

const DEFAULT_DB_FILE: &str = "healthlog.sqlite3";
/// A full day; larger windows would match more than one candidate dose.
const MAX_TOLERANCE_MINUTES: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    OutOfRange { key: &'static str, value: u32, max: u32 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got `{value}`")
            }
            Self::OutOfRange { key, value, max } => {
                write!(f, "{key} must be at most {max}, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub reminder_tolerance_minutes: u32,
    /// Override for the built-in interaction table.
    pub interactions_path: Option<PathBuf>,
    /// Override for the built-in medication info table.
    pub med_info_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
            reminder_tolerance_minutes: DEFAULT_TOLERANCE_MINUTES,
            interactions_path: None,
            med_info_path: None,
        }
    }
}

impl CoreConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(raw) = read(ENV_REMINDER_TOLERANCE) {
            config.reminder_tolerance_minutes = parse_tolerance(&raw)?;
        }
        config.interactions_path = read(ENV_INTERACTIONS_PATH).map(PathBuf::from);
        config.med_info_path = read(ENV_MED_INFO_PATH).map(PathBuf::from);
        Ok(config)
    }
}

fn parse_tolerance(raw: &str) -> Result<u32, ConfigError> {
    let value = raw
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidNumber {
            key: ENV_REMINDER_TOLERANCE,
            value: raw.to_string(),
        })?;
    if value > MAX_TOLERANCE_MINUTES {
        return Err(ConfigError::OutOfRange {
            key: ENV_REMINDER_TOLERANCE,
            value,
            max: MAX_TOLERANCE_MINUTES,
        });
    }
    Ok(value)
}
