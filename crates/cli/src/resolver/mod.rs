// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Module path resolution.
//!
//! Turns the specifiers a unit imports into concrete files. Alias rules are
//! tried first, in registration order; the first matching rule decides and
//! its candidates must exist. Without a matching rule, relative specifiers
//! resolve against the importing file's directory and bare specifiers are
//! searched for in module directories of every ancestor.
//!
//! The resolver only reads its rules and the filesystem, so one instance is
//! shared by all workers. Successful resolutions are memoized per
//! (directory, specifier).

mod alias;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::config::{Config, normalize};
use crate::error::{Error, Result};

pub use alias::AliasRule;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// A file on disk.
    File(PathBuf),
    /// A runtime-provided module; nothing to load.
    Builtin(String),
}

impl Resolution {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::File(p) => Some(p),
            Resolution::Builtin(_) => None,
        }
    }
}

/// Shared, read-only module resolver.
pub struct PathResolver {
    rules: Vec<AliasRule>,
    extensions: Vec<String>,
    module_directories: Vec<String>,
    builtins: HashSet<String>,
    cache: DashMap<(PathBuf, String), Resolution>,
}

impl PathResolver {
    pub fn new(
        rules: Vec<AliasRule>,
        extensions: Vec<String>,
        module_directories: Vec<String>,
        builtins: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            rules,
            extensions,
            module_directories,
            builtins: builtins.into_iter().collect(),
            cache: DashMap::new(),
        }
    }

    /// Build a resolver from validated config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.alias_rules()?,
            config.module_file_extensions.clone(),
            config.module_directories.clone(),
            config.builtin_modules.iter().cloned(),
        ))
    }

    /// Resolve `specifier` as imported from `from_file`.
    pub fn resolve(&self, specifier: &str, from_file: &Path) -> Result<Resolution> {
        let from_dir = from_file.parent().unwrap_or_else(|| Path::new("/"));
        let key = (from_dir.to_path_buf(), specifier.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        let resolution = self.resolve_uncached(specifier, from_dir).ok_or_else(|| {
            Error::UnresolvedModule {
                specifier: specifier.to_string(),
                from: from_file.to_path_buf(),
            }
        })?;

        tracing::debug!(
            "resolved '{}' from {} -> {:?}",
            specifier,
            from_file.display(),
            resolution
        );
        self.cache.insert(key, resolution.clone());
        Ok(resolution)
    }

    fn resolve_uncached(&self, specifier: &str, from_dir: &Path) -> Option<Resolution> {
        if let Some((rule, candidates)) = self
            .rules
            .iter()
            .find_map(|rule| rule.apply(specifier).map(|c| (rule, c)))
        {
            // The first matching rule owns the specifier; no fallback.
            tracing::debug!("'{}' matched alias '{}'", specifier, rule.pattern());
            return candidates
                .iter()
                .find_map(|c| self.resolve_path(&anchor(from_dir, c)))
                .map(Resolution::File);
        }

        if let Some(name) = self.builtin_name(specifier) {
            return Some(Resolution::Builtin(name.to_string()));
        }

        if is_relative(specifier) {
            return self
                .resolve_path(&anchor(from_dir, specifier))
                .map(Resolution::File);
        }

        from_dir.ancestors().find_map(|dir| {
            self.module_directories.iter().find_map(|modules| {
                self.resolve_path(&dir.join(modules).join(specifier))
                    .map(Resolution::File)
            })
        })
    }

    fn builtin_name<'a>(&self, specifier: &'a str) -> Option<&'a str> {
        if let Some(name) = specifier.strip_prefix("node:") {
            return Some(name);
        }
        let head = specifier.split('/').next().unwrap_or(specifier);
        self.builtins.contains(head).then_some(specifier)
    }

    /// Try `base` as a file, with each extension appended, then as a
    /// directory (package.json `main`, then `index.<ext>`).
    fn resolve_path(&self, base: &Path) -> Option<PathBuf> {
        if let Some(file) = self.resolve_file(base) {
            return Some(file);
        }
        if base.is_dir() {
            if let Some(main) = package_main(base)
                && let Some(file) = self.resolve_file(&normalize(&base.join(main)))
            {
                return Some(file);
            }
            return self.resolve_file(&base.join("index"));
        }
        None
    }

    fn resolve_file(&self, base: &Path) -> Option<PathBuf> {
        if base.is_file() {
            return Some(base.to_path_buf());
        }
        self.extensions.iter().find_map(|ext| {
            let mut candidate = base.as_os_str().to_os_string();
            candidate.push(".");
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            candidate.is_file().then_some(candidate)
        })
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || Path::new(specifier).is_absolute()
}

fn anchor(dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        normalize(p)
    } else {
        normalize(&dir.join(p))
    }
}

#[derive(Deserialize)]
struct PackageManifest {
    main: Option<String>,
}

fn package_main(dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(dir.join("package.json")).ok()?;
    serde_json::from_str::<PackageManifest>(&content).ok()?.main
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
