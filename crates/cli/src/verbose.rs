// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Verbose output logger for diagnostic information.
//!
//! Writes sectioned diagnostics (configuration, discovery, scheduling) to
//! stderr. Enabled with `--verbose`.

/// Verbose output logger. Writes to stderr when enabled.
pub struct VerboseLogger {
    enabled: bool,
}

impl VerboseLogger {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Print a verbose line to stderr (indented as content under a section).
    pub fn log(&self, msg: &str) {
        if self.enabled {
            eprintln!("  {}", msg);
        }
    }

    /// Print a verbose section header.
    pub fn section(&self, title: &str) {
        if self.enabled {
            eprintln!("\n{}:", title);
        }
    }

    /// Log a list under `label`, or `label: (none)`.
    pub fn list(&self, label: &str, items: &[String]) {
        if !self.enabled {
            return;
        }
        if items.is_empty() {
            self.log(&format!("{label}: (none)"));
        } else {
            self.log(&format!("{label}: {}", items.join(", ")));
        }
    }
}

#[cfg(test)]
#[path = "verbose_tests.rs"]
mod tests;
