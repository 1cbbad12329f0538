// src/error.rs

//! Unified error handling for the mirror.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for mirror operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (transport error or non-2xx status)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A listing or content response could not be used
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// A page link does not map onto a safe output path
    #[error("Invalid output path {path:?}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// Pagination returned a cursor that was already visited
    #[error("Pagination cycle detected at {0}")]
    PaginationCycle(String),

    /// A version-control command failed
    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },

    /// The run was cancelled by a signal
    #[error("Interrupted")]
    Interrupted,
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error for the given URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a git command error.
    pub fn git(command: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Git {
            command: command.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_message() {
        let err = AppError::fetch("https://wiki/rest/api/content/1", "invalid JSON");
        assert_eq!(
            err.to_string(),
            "Fetch error for https://wiki/rest/api/content/1: invalid JSON"
        );
    }

    #[test]
    fn test_git_error_message() {
        let err = AppError::git("push", "exit status 128");
        assert_eq!(err.to_string(), "git push failed: exit status 128");
    }
}
