//! Engine error types.
//!
//! Guard failures on mode transitions are deliberately not errors; they are
//! dropped inside the coordinator. The variants here cover usage errors and
//! configuration problems that a caller has to act on.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by the monitoring engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An operation was called in a state where it is not allowed.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The engine actor has shut down and no longer accepts events.
    #[error("engine channel closed")]
    ChannelClosed,
}

impl EngineError {
    /// Returns true if this error is an invalid-operation usage error.
    #[must_use]
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation(_))
    }
}

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file parsed, but a value failed validation.
    #[error(transparent)]
    Invalid(#[from] EngineError),
}
