// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration loading and validation.
//!
//! The config file is read once at startup and is read-only afterwards.
//! Keys are snake_case; the camelCase spellings familiar from jest configs
//! are accepted as aliases.

pub mod defaults;
mod threshold;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::Glob;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::resolver::AliasRule;

pub use threshold::{CoverageThresholdConfig, ThresholdConfig};

/// Top-level keys recognized in `testgate.toml` (including aliases).
const KNOWN_KEYS: &[&str] = &[
    "version",
    "root_dir",
    "rootDir",
    "roots",
    "test_match",
    "testMatch",
    "test_path_ignore_patterns",
    "testPathIgnorePatterns",
    "prune_dirs",
    "pass_with_no_tests",
    "passWithNoTests",
    "module_file_extensions",
    "moduleFileExtensions",
    "module_directories",
    "moduleDirectories",
    "builtin_modules",
    "module_name_mapper",
    "moduleNameMapper",
    "collect_coverage",
    "collectCoverage",
    "collect_coverage_from",
    "collectCoverageFrom",
    "coverage_path_ignore_patterns",
    "coveragePathIgnorePatterns",
    "coverage_directory",
    "coverageDirectory",
    "coverage_threshold",
    "coverageThreshold",
    "test_timeout",
    "testTimeout",
    "max_workers",
    "maxWorkers",
    "bail",
    "cache_directory",
    "cacheDirectory",
    "runner",
];

/// Supported config format version.
pub const CONFIG_VERSION: i64 = 1;

/// Run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Config format version.
    pub version: i64,

    /// Project root. Relative values are resolved against the config file's
    /// directory. Substituted for `<rootDir>` everywhere else.
    #[serde(alias = "rootDir")]
    pub root_dir: PathBuf,

    /// Directories searched for tests, in order.
    pub roots: Vec<String>,

    /// Globs (relative to each root) selecting test files.
    #[serde(alias = "testMatch")]
    pub test_match: Vec<String>,

    /// Regexes over absolute paths; matching test files are skipped.
    #[serde(alias = "testPathIgnorePatterns")]
    pub test_path_ignore_patterns: Vec<String>,

    /// Directory names pruned during discovery.
    pub prune_dirs: Vec<String>,

    /// Succeed when discovery finds nothing.
    #[serde(alias = "passWithNoTests")]
    pub pass_with_no_tests: bool,

    /// Extensions tried when resolving extensionless specifiers.
    #[serde(alias = "moduleFileExtensions")]
    pub module_file_extensions: Vec<String>,

    /// Directories searched in each ancestor for bare specifiers.
    #[serde(alias = "moduleDirectories")]
    pub module_directories: Vec<String>,

    /// Specifiers provided by the runtime.
    pub builtin_modules: Vec<String>,

    /// Alias rules, applied in order; first match wins.
    #[serde(alias = "moduleNameMapper")]
    pub module_name_mapper: Vec<AliasRuleConfig>,

    /// Collect coverage and enforce thresholds.
    #[serde(alias = "collectCoverage")]
    pub collect_coverage: bool,

    /// Globs (relative to the root directory) of files that must appear in
    /// coverage even when no unit executes them.
    #[serde(alias = "collectCoverageFrom")]
    pub collect_coverage_from: Vec<String>,

    /// Regexes over absolute paths dropped from coverage.
    #[serde(alias = "coveragePathIgnorePatterns")]
    pub coverage_path_ignore_patterns: Vec<String>,

    /// Output directory for coverage artifacts.
    #[serde(alias = "coverageDirectory")]
    pub coverage_directory: PathBuf,

    #[serde(alias = "coverageThreshold")]
    pub coverage_threshold: CoverageThresholdConfig,

    /// Per-unit timeout in milliseconds.
    #[serde(alias = "testTimeout")]
    pub test_timeout: u64,

    /// Worker count (None = available parallelism).
    #[serde(alias = "maxWorkers")]
    pub max_workers: Option<usize>,

    /// Stop scheduling after this many non-passing units (0 = never).
    pub bail: usize,

    /// Directory for run history.
    #[serde(alias = "cacheDirectory")]
    pub cache_directory: PathBuf,

    pub runner: RunnerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            root_dir: PathBuf::from("."),
            roots: vec![defaults::ROOT_DIR_TOKEN.to_string()],
            test_match: defaults::test_patterns::test_match(),
            test_path_ignore_patterns: defaults::test_patterns::test_path_ignore(),
            prune_dirs: defaults::test_patterns::prune_dirs(),
            pass_with_no_tests: false,
            module_file_extensions: defaults::modules::file_extensions(),
            module_directories: defaults::modules::directories(),
            builtin_modules: defaults::modules::builtins(),
            module_name_mapper: Vec::new(),
            collect_coverage: false,
            collect_coverage_from: Vec::new(),
            coverage_path_ignore_patterns: defaults::coverage::path_ignore(),
            coverage_directory: PathBuf::from(defaults::coverage::DIRECTORY),
            coverage_threshold: CoverageThresholdConfig::default(),
            test_timeout: defaults::execution::TEST_TIMEOUT_MS,
            max_workers: None,
            bail: 0,
            cache_directory: PathBuf::from(defaults::cache::DIRECTORY),
            runner: RunnerConfig::default(),
        }
    }
}

/// One `[[module_name_mapper]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasRuleConfig {
    /// Regex (`^@/(.*)$`), single-wildcard (`@/*`) or literal pattern.
    pub pattern: String,

    /// Target template(s), tried in order.
    #[serde(alias = "targets")]
    pub target: OneOrMany,
}

/// A single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// `[runner]` table: how a unit process is launched.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Program and arguments. `{unit}` and `{root}` are substituted.
    pub command: Vec<String>,

    /// Extra environment variables for unit processes.
    pub env: BTreeMap<String, String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: defaults::execution::runner_command(),
            env: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Absolute paths of the configured roots, in order.
    pub fn root_paths(&self) -> Vec<PathBuf> {
        self.roots
            .iter()
            .map(|r| absolutize(&self.root_dir, &self.expand_root(r)))
            .collect()
    }

    /// Replace `<rootDir>` in `value` with the root directory.
    pub fn expand_root(&self, value: &str) -> String {
        value.replace(
            defaults::ROOT_DIR_TOKEN,
            &self.root_dir.to_string_lossy(),
        )
    }

    /// Compile the alias rules in registration order.
    pub fn alias_rules(&self) -> Result<Vec<AliasRule>> {
        self.module_name_mapper
            .iter()
            .map(|rule| {
                let targets = rule
                    .target
                    .clone()
                    .into_vec()
                    .iter()
                    .map(|t| self.expand_root(t))
                    .collect();
                AliasRule::new(&rule.pattern, targets)
            })
            .collect()
    }

    /// Absolute coverage output directory.
    pub fn coverage_dir(&self) -> PathBuf {
        absolutize(
            &self.root_dir,
            &self.expand_root(&self.coverage_directory.to_string_lossy()),
        )
    }

    /// Absolute cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        absolutize(
            &self.root_dir,
            &self.expand_root(&self.cache_directory.to_string_lossy()),
        )
    }

    /// Anchor `root_dir` at `base` (the config file's directory).
    pub fn anchor(&mut self, base: &Path) {
        if self.root_dir.is_relative() {
            self.root_dir = normalize(&base.join(&self.root_dir));
        }
    }

    /// Validate everything that can be checked before a run starts.
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(Error::config(format!(
                "unsupported config version {} (expected {CONFIG_VERSION})",
                self.version
            )));
        }

        if self.roots.is_empty() {
            return Err(Error::config("roots must name at least one directory"));
        }
        for root in self.root_paths() {
            if !root.is_dir() {
                return Err(Error::config(format!(
                    "root directory not found: {}",
                    root.display()
                )));
            }
        }

        for pattern in self.test_match.iter().chain(&self.collect_coverage_from) {
            Glob::new(pattern)
                .map_err(|e| Error::config(format!("invalid glob '{pattern}': {e}")))?;
        }

        for pattern in self
            .test_path_ignore_patterns
            .iter()
            .chain(&self.coverage_path_ignore_patterns)
        {
            Regex::new(&self.expand_root(pattern))
                .map_err(|e| Error::config(format!("invalid regex '{pattern}': {e}")))?;
        }

        self.alias_rules()?;

        if self.max_workers == Some(0) {
            return Err(Error::config("max_workers must be at least 1"));
        }
        if self.test_timeout == 0 {
            return Err(Error::config("test_timeout must be at least 1 ms"));
        }
        if self.runner.command.is_empty() {
            return Err(Error::config("runner.command must not be empty"));
        }

        self.coverage_threshold.global.validate()
    }
}

/// Find testgate.toml starting from `start_dir` and walking up to git root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(defaults::CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        // Stop at git root
        if current.join(".git").exists() {
            return None;
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Load config from file, warning about unknown top-level keys.
///
/// The returned config has `root_dir` anchored at the file's directory but
/// is not validated; call [`Config::validate`] after applying overrides.
pub fn load_with_warnings(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    if let Ok(toml::Value::Table(table)) = content.parse::<toml::Value>() {
        for key in table.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!("unknown config key '{}' in {}", key, path.display());
                eprintln!("warning: unknown config key '{}' in {}", key, path.display());
            }
        }
    }

    let mut config = parse(&content, path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let base = if base.as_os_str().is_empty() {
        Path::new(".")
    } else {
        base
    };
    let base = std::path::absolute(base).map_err(|e| Error::io(base, e))?;
    config.anchor(&base);
    Ok(config)
}

/// Parse config content. Unknown keys are ignored here.
pub fn parse(content: &str, path: &Path) -> Result<Config> {
    toml::from_str(content).map_err(|e| Error::Config {
        message: format!("{}: {}", path.display(), e.message()),
        path: Some(path.to_path_buf()),
    })
}

fn absolutize(base: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Lexically normalize `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
