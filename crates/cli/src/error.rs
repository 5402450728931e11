// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy and process exit codes.
//!
//! Only configuration faults and an empty discovery are fatal. Per-unit
//! faults (unresolved imports, timeouts, crashes) are recorded as the
//! unit's outcome and never surface as `Err` from the engine.

use std::path::PathBuf;

/// Library error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration, detected before any unit runs.
    #[error("config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Discovery produced no units and empty runs are not allowed.
    #[error("no tests found in {} root(s) matching {patterns:?}", roots.len())]
    NoTestsFound {
        roots: Vec<PathBuf>,
        patterns: Vec<String>,
    },

    /// A module specifier could not be mapped to a file.
    #[error("cannot find module '{specifier}' from {}", from.display())]
    UnresolvedModule { specifier: String, from: PathBuf },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            path: None,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Exit code a fatal occurrence of this error maps to.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::Config { .. } => ExitCode::ConfigError,
            Error::NoTestsFound { .. } | Error::UnresolvedModule { .. } => ExitCode::Failed,
            Error::Io { .. } => ExitCode::InternalError,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Every unit passed and every threshold held.
    Success = 0,
    /// Failing units, threshold violations or no tests found.
    Failed = 1,
    /// Configuration could not be loaded or validated.
    ConfigError = 2,
    /// Unexpected internal error.
    InternalError = 3,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
