// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized default values for configuration.
//!
//! All default values are documented here for easy reference.
//! `Config::default` and the serde defaults call these directly.

/// Config file name looked up from the working directory upward.
pub const CONFIG_FILE: &str = "testgate.toml";

/// Token replaced by the absolute root directory in paths and templates.
pub const ROOT_DIR_TOKEN: &str = "<rootDir>";

/// Execution defaults.
pub mod execution {
    /// Per-unit timeout in milliseconds.
    pub const TEST_TIMEOUT_MS: u64 = 5000;

    /// Grace period the watchdog allows past the deadline before abandoning
    /// an executor that ignores its own deadline.
    pub const WATCHDOG_GRACE_MS: u64 = 250;

    /// Command used to execute a unit. `{unit}` is the unit's absolute path.
    pub fn runner_command() -> Vec<String> {
        vec!["node".to_string(), "{unit}".to_string()]
    }
}

/// Default glob patterns for test file detection.
pub mod test_patterns {
    /// Test files: anything under `__tests__` or named `*.test.*` / `*.spec.*`.
    pub fn test_match() -> Vec<String> {
        vec![
            "**/__tests__/**/*.{js,jsx,ts,tsx}".to_string(),
            "**/*.{spec,test}.{js,jsx,ts,tsx}".to_string(),
        ]
    }

    /// Directory names pruned before any pattern matching.
    pub fn prune_dirs() -> Vec<String> {
        vec![
            "node_modules".to_string(),
            ".git".to_string(),
            "coverage".to_string(),
            "dist".to_string(),
            "build".to_string(),
            "target".to_string(),
        ]
    }

    /// Regexes over absolute paths that drop test files.
    pub fn test_path_ignore() -> Vec<String> {
        vec!["/node_modules/".to_string()]
    }
}

/// Module resolution defaults.
pub mod modules {
    /// Extensions tried, in order, when a specifier has none.
    pub fn file_extensions() -> Vec<String> {
        ["js", "mjs", "cjs", "jsx", "ts", "tsx", "json", "node"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Directories searched in each ancestor for bare specifiers.
    pub fn directories() -> Vec<String> {
        vec!["node_modules".to_string()]
    }

    /// Specifiers provided by the host runtime; never loaded from disk.
    pub fn builtins() -> Vec<String> {
        [
            "assert", "buffer", "child_process", "crypto", "events", "fs", "http", "https",
            "net", "os", "path", "process", "stream", "timers", "url", "util", "worker_threads",
            "zlib",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

/// Coverage defaults.
pub mod coverage {
    /// Output directory for coverage artifacts, relative to the root directory.
    pub const DIRECTORY: &str = "coverage";

    /// File written into the coverage directory for external reporters.
    pub const SUMMARY_FILE: &str = "coverage-summary.json";

    /// Regexes over absolute paths dropped from coverage.
    pub fn path_ignore() -> Vec<String> {
        vec!["/node_modules/".to_string()]
    }
}

/// Cache defaults.
pub mod cache {
    /// Cache directory, relative to the root directory.
    pub const DIRECTORY: &str = ".testgate";

    /// Per-unit durations from the previous run.
    pub const DURATIONS_FILE: &str = "durations.json";
}
