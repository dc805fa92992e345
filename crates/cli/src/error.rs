// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types and process exit codes.

use std::path::PathBuf;

/// qgate error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file invalid, or an invalid scope/dimension combination
    #[error("config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid command-line arguments
    #[error("argument error: {0}")]
    Argument(String),

    /// Required tool binaries missing or incompatible
    #[error("environment error: {0}")]
    Environment(String),

    /// File I/O error
    #[error("io error: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Internal error (bug)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error not tied to a file.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            path: None,
        }
    }
}

/// Result type using qgate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
///
/// These are a contract with CI systems and must not change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// No error or warning violations
    Success = 0,
    /// Error violations, or an environment/configuration/execution fault
    Failed = 1,
    /// Warning violations only (non-blocking)
    Warnings = 2,
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config { .. }
            | Error::Argument(_)
            | Error::Environment(_)
            | Error::Io { .. }
            | Error::Internal(_) => ExitCode::Failed,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
