#![forbid(unsafe_code)]

//! Error types.
//!
//! The engine itself never fails: stale callbacks and malformed markup are
//! logged and skipped. Errors only surface from the strict attribute parsers,
//! whose lenient callers fall back to defaults.

use thiserror::Error;

/// Invalid configuration value read from a data attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown toast position: {value:?}")]
    InvalidPosition { value: String },

    #[error("visible-toast cap is not a non-negative integer: {value:?}")]
    InvalidCap { value: String },

    #[error("duration is not an integer number of milliseconds: {value:?}")]
    InvalidDuration { value: String },
}

impl ConfigError {
    /// The raw attribute value that failed to parse.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::InvalidPosition { value }
            | Self::InvalidCap { value }
            | Self::InvalidDuration { value } => value,
        }
    }
}
