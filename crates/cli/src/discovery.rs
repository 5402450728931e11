// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test discovery.
//!
//! Walks each root in the order given and yields files whose root-relative
//! path matches a `test_match` glob. Within a root, files come in
//! lexicographic path order, so the same tree always yields the same units
//! with the same ids. Pruned directories are skipped before matching.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

/// Stable unit identifier: the unit's path relative to the root directory,
/// `/`-separated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for `path` relative to `root_dir` (absolute if outside it).
    pub fn for_path(path: &Path, root_dir: &Path) -> Self {
        let rel = path.strip_prefix(root_dir).unwrap_or(path);
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let joined = parts.join("/");
        if rel.is_absolute() {
            // RootDir component renders as "/", avoid a doubled separator.
            Self(format!("/{}", joined.trim_start_matches('/')))
        } else {
            Self(joined)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One discovered test file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestUnit {
    pub id: UnitId,
    /// Absolute path.
    pub path: PathBuf,
    pub discovered_at: DateTime<Utc>,
    /// Position in discovery order.
    pub ordinal: usize,
}

/// Inputs to [`discover`].
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Base for unit ids.
    pub root_dir: PathBuf,
    /// Absolute directories, processed in order.
    pub roots: Vec<PathBuf>,
    /// Globs over root-relative paths.
    pub test_match: Vec<String>,
    /// Regexes over absolute paths; matching files are dropped.
    pub ignore_patterns: Vec<String>,
    /// Directory names pruned before matching.
    pub prune_dirs: Vec<String>,
    /// Return an empty list instead of failing.
    pub allow_empty: bool,
}

impl DiscoveryConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            roots: config.root_paths(),
            test_match: config.test_match.clone(),
            ignore_patterns: config
                .test_path_ignore_patterns
                .iter()
                .map(|p| config.expand_root(p))
                .collect(),
            prune_dirs: config.prune_dirs.clone(),
            allow_empty: config.pass_with_no_tests,
        }
    }
}

/// Discover test units.
pub fn discover(config: &DiscoveryConfig) -> Result<Vec<TestUnit>> {
    let matcher = build_glob_set(&config.test_match)?;
    let ignore = config
        .ignore_patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| Error::config(format!("invalid regex '{p}': {e}"))))
        .collect::<Result<Vec<_>>>()?;

    let discovered_at = Utc::now();
    let mut seen = HashSet::new();
    let mut units = Vec::new();

    for root in &config.roots {
        let mut matched = 0usize;
        for path in walk_sorted(root, &config.prune_dirs) {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            if !matcher.is_match(rel) {
                continue;
            }
            let display = path.to_string_lossy();
            if ignore.iter().any(|re| re.is_match(&display)) {
                tracing::debug!("ignored test file {}", path.display());
                continue;
            }
            if !seen.insert(path.clone()) {
                continue;
            }
            matched += 1;
            units.push(TestUnit {
                id: UnitId::for_path(&path, &config.root_dir),
                ordinal: units.len(),
                path,
                discovered_at,
            });
        }
        tracing::debug!("root {}: {} test file(s)", root.display(), matched);
    }

    if units.is_empty() && !config.allow_empty {
        return Err(Error::NoTestsFound {
            roots: config.roots.clone(),
            patterns: config.test_match.clone(),
        });
    }

    Ok(units)
}

/// Files under `root` in lexicographic path order, skipping pruned
/// directories (by name) below the root.
pub fn walk_sorted(root: &Path, prune_dirs: &[String]) -> Vec<PathBuf> {
    let prune = prune_dirs.to_vec();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let pruned = is_dir
                && entry.depth() > 0
                && prune.iter().any(|p| entry.file_name() == p.as_str());
            !pruned
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(e) if e.file_type().is_some_and(|t| t.is_file()) => {
                files.push(e.into_path());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("walk error under {}: {}", root.display(), e),
        }
    }
    files
}

/// Build a GlobSet where `*` does not cross directory separators.
pub fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| Error::config(format!("invalid glob '{pattern}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::config(format!("invalid glob set: {e}")))
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
