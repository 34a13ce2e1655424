//! Configuration error types
//!
//! These are the only errors the timer core produces. They are raised when a
//! workout is parsed, validated or built, never while a timer is running.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown timer type: {0}")]
    UnknownType(String),

    #[error("{field} must be greater than zero")]
    NotPositive { field: String },

    #[error("workout has no intervals")]
    EmptyIntervals,

    #[error("interval {index} ({name}) has zero duration")]
    ZeroLengthInterval { index: usize, name: String },

    #[error("workout is too long to time")]
    TooLong,

    #[error("workout expands to more than {max} intervals per round")]
    TooManyIntervals { max: usize },

    #[error("failed to parse timer config")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read timer config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
