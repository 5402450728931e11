// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Testgate library.
//!
//! Discovers test units, runs each one in an isolated context, merges the
//! coverage they record and gates the run on configured thresholds.

pub mod cli;
pub mod color;
pub mod config;
pub mod coverage;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod file_reader;
pub mod gate;
pub mod history;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod verbose;

#[cfg(test)]
pub mod test_utils;

pub use error::{Error, ExitCode, Result};
