// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Unit duration history.
//!
//! `<cache_directory>/durations.json` keeps how long each unit took in the
//! previous run. The engine uses it to start slow units first so they do
//! not end up running alone at the tail of a run. Reporting order is not
//! affected.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::discovery::{TestUnit, UnitId};
use crate::engine::ExecutionResult;

/// Durations of the most recent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationHistory {
    /// Last update timestamp (ISO 8601).
    pub updated: DateTime<Utc>,

    /// Unit id -> duration in milliseconds.
    pub units: BTreeMap<UnitId, u64>,
}

impl Default for DurationHistory {
    fn default() -> Self {
        Self {
            updated: Utc::now(),
            units: BTreeMap::new(),
        }
    }
}

impl DurationHistory {
    /// Save history to file, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load history from file, returning None if not found.
    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Like [`load`](Self::load), but an unreadable file is only a warning.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(history) => history.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("ignoring duration history {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Record the durations of finished units.
    ///
    /// Units that did not run this time keep their previous entry.
    pub fn record<'a>(&mut self, results: impl IntoIterator<Item = &'a ExecutionResult>) {
        for result in results {
            self.units
                .insert(result.unit_id.clone(), result.duration.as_millis() as u64);
        }
        self.updated = Utc::now();
    }

    /// Drop entries for units that were not discovered this run.
    pub fn retain_units(&mut self, units: &[TestUnit]) {
        let current: HashSet<&UnitId> = units.iter().map(|u| &u.id).collect();
        self.units.retain(|id, _| current.contains(id));
    }

    /// Indices into `units` in scheduling order: units without history first
    /// (discovery order), then the rest by previous duration, longest first.
    pub fn schedule(&self, units: &[TestUnit]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..units.len()).collect();
        order.sort_by_key(|&idx| {
            let known = units.get(idx).and_then(|u| self.units.get(&u.id));
            (known.is_some(), std::cmp::Reverse(known.copied().unwrap_or(0)), idx)
        });
        order
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
