//! Error types for calgrid
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, malformed dates, invalid config)
//! - 4: Operation failed (I/O, serialization)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the calgrid CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Failure to read a wall-clock date, time, or timestamp.
///
/// Malformed values are never coerced to "now" or to the epoch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty date/time value")]
    Empty,

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid time '{0}' (expected HH:MM)")]
    InvalidTime(String),

    #[error("invalid timestamp '{0}' (expected YYYY-MM-DDTHH:MM:SS)")]
    InvalidTimestamp(String),
}

/// Reasons an input event cannot be laid out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("event id cannot be empty")]
    MissingId,

    #[error("event '{0}' has neither a start nor an end")]
    MissingTimes(String),

    #[error("event '{id}' has a malformed {field}: {source}")]
    Malformed {
        id: String,
        field: &'static str,
        #[source]
        source: ParseError,
    },
}

/// Main error type for calgrid operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Events file not found: {0}")]
    EventsNotFound(PathBuf),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Parse(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::EventsNotFound(_) => exit_codes::USER_ERROR,

            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for calgrid operations
pub type Result<T> = std::result::Result<T, Error>;
