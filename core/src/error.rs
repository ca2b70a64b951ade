//! Error types for timer operations

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::{SubTimerId, TimerOp, TimerState};

/// Errors returned by the public timer operations.
///
/// Every variant is detected before any field is touched, so a failed
/// operation leaves the timer exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("cannot {operation} while timer is {state}")]
    InvalidStateTransition { operation: TimerOp, state: TimerState },

    #[error("invalid value {value} for {field}")]
    InvalidConfigValue { field: &'static str, value: i64 },

    #[error("subtimer {0} already exists")]
    DuplicateIdentifier(SubTimerId),

    #[error("subtimer {0} does not exist")]
    UnknownIdentifier(SubTimerId),

    #[error("timer engine has shut down")]
    EngineClosed,
}

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[source] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),

    #[error("failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML")]
    ParseToml(#[from] toml::de::Error),

    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
