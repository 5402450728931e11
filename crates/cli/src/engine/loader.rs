// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-unit module registry.
//!
//! Starting from the unit file, every static import, re-export, `require`
//! and literal dynamic `import()` is resolved through the [`PathResolver`].
//! Resolved script files are scanned in turn. The first specifier that
//! cannot be resolved aborts loading with `Error::UnresolvedModule`.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::file_reader;
use crate::resolver::{PathResolver, Resolution};

/// `import ... from 'x'` and `export ... from 'x'`.
#[allow(clippy::expect_used)]
static FROM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:import|export)\b[^'";]*?\bfrom\s*['"]([^'"\n]+)['"]"#)
        .expect("valid regex pattern")
});

/// Side-effect imports: `import 'x'`.
#[allow(clippy::expect_used)]
static BARE_IMPORT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s*['"]([^'"\n]+)['"]"#).expect("valid regex pattern")
});

/// `require('x')` and `import('x')` with a literal argument.
#[allow(clippy::expect_used)]
static CALL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:require|import)\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#)
        .expect("valid regex pattern")
});

/// Extensions whose files are scanned for further imports.
const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

/// Resolved import graph of one unit.
///
/// Created fresh for every unit and dropped with it; nothing is shared
/// between units.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleRegistry {
    /// The unit file.
    pub entry: PathBuf,
    /// Importing file -> specifier -> resolution.
    pub modules: BTreeMap<PathBuf, BTreeMap<String, Resolution>>,
}

impl ModuleRegistry {
    /// Load the import graph rooted at `entry`.
    pub fn load(entry: &Path, resolver: &PathResolver) -> Result<Self> {
        let mut registry = ModuleRegistry {
            entry: entry.to_path_buf(),
            modules: BTreeMap::new(),
        };
        let mut queue = VecDeque::from([entry.to_path_buf()]);

        while let Some(file) = queue.pop_front() {
            if registry.modules.contains_key(&file) {
                continue;
            }
            let specifiers =
                file_reader::with_text(&file, scan_imports).map_err(|e| Error::io(&file, e))?;

            let mut resolved = BTreeMap::new();
            for specifier in specifiers {
                let resolution = resolver.resolve(&specifier, &file)?;
                if let Resolution::File(path) = &resolution
                    && is_script(path)
                    && !registry.modules.contains_key(path)
                {
                    queue.push_back(path.clone());
                }
                resolved.insert(specifier, resolution);
            }
            tracing::trace!("{}: {} import(s)", file.display(), resolved.len());
            registry.modules.insert(file, resolved);
        }

        Ok(registry)
    }

    /// Every file in the graph, entry included.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.modules.keys().map(PathBuf::as_path)
    }

    pub fn resolve(&self, from: &Path, specifier: &str) -> Option<&Resolution> {
        self.modules.get(from)?.get(specifier)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Import specifiers in `source`, in order of first appearance.
pub fn scan_imports(source: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = Vec::new();
    for pattern in [&*FROM_PATTERN, &*BARE_IMPORT_PATTERN, &*CALL_PATTERN] {
        for caps in pattern.captures_iter(source) {
            let (Some(whole), Some(spec)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if in_comment(source, whole.start()) {
                continue;
            }
            found.push((whole.start(), spec.as_str().to_string()));
        }
    }
    found.sort_by_key(|(pos, _)| *pos);

    let mut specifiers: Vec<String> = Vec::with_capacity(found.len());
    for (_, spec) in found {
        if !specifiers.contains(&spec) {
            specifiers.push(spec);
        }
    }
    specifiers
}

/// Whether `pos` sits on a line that is commented out before it.
fn in_comment(source: &str, pos: usize) -> bool {
    let line_start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let line = source[line_start..].trim_start();
    line.starts_with('*') || line.starts_with("/*") || has_line_comment(&source[line_start..pos])
}

/// Whether `prefix` opens a `//` comment outside of any string literal.
fn has_line_comment(prefix: &str) -> bool {
    let mut quote: Option<char> = None;
    let mut chars = prefix.chars().peekable();
    while let Some(c) = chars.next() {
        match quote {
            Some(_) if c == '\\' => {
                chars.next();
            }
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '/' if chars.peek() == Some(&'/') => return true,
                _ => {}
            },
        }
    }
    false
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SCRIPT_EXTENSIONS.contains(&e))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
