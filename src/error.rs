//! Error types for data access, template persistence and configuration.
//!
//! None of the [`SourceError`] variants are fatal for the application: the
//! reconciler scopes them to a single line or file and keeps going. Only a
//! [`TemplateError`] aborts an import.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure to obtain channel data from a simulation output file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {0}")]
    FileUnavailable(PathBuf),

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("channel '{channel}' not found in {file}")]
    ChannelNotFound { file: PathBuf, channel: String },

    #[error("could not parse {file}: {reason}")]
    Parse { file: PathBuf, reason: String },

    #[error("legacy helper exited with {status}: {stderr}")]
    ExternalProcess { status: String, stderr: String },

    #[error("legacy helper did not answer within {after:?}")]
    Timeout { after: Duration },

    #[error("legacy helper call cancelled")]
    Cancelled,

    #[error("no reader available for {0}")]
    ReaderUnavailable(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub(crate) fn parse(file: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse {
            file: file.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure to read or write a template file.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("cannot access template file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed template: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to load the viewer configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },
}
