// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `coverage-summary.json`, in the Istanbul json-summary layout:
//! a `total` entry plus one entry per file, each holding
//! `{total, covered, skipped, pct}` for every metric.

use std::path::Path;

use serde_json::{Map, Value, json};

use crate::config::defaults;
use crate::coverage::{Counter, CoverageMap, CoverageTotals};
use crate::error::{Error, Result};

fn metric_entry(counter: Counter) -> Value {
    json!({
        "total": counter.total,
        "covered": counter.covered,
        "skipped": 0,
        "pct": counter.percent(),
    })
}

fn totals_entry(totals: &CoverageTotals) -> Value {
    let mut entry = Map::new();
    for (metric, counter) in totals.iter() {
        entry.insert(metric.to_string(), metric_entry(counter));
    }
    Value::Object(entry)
}

/// Build the summary document.
pub fn coverage_summary(map: &CoverageMap, totals: &CoverageTotals) -> Value {
    let mut doc = Map::new();
    doc.insert("total".to_string(), totals_entry(totals));
    for (path, file) in map.files() {
        doc.insert(path.to_string_lossy().into_owned(), totals_entry(&file.totals()));
    }
    Value::Object(doc)
}

/// Write the summary into `dir`, creating it if needed.
pub fn write_coverage_summary(dir: &Path, map: &CoverageMap, totals: &CoverageTotals) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    let path = dir.join(defaults::coverage::SUMMARY_FILE);
    let content = serde_json::to_string_pretty(&coverage_summary(map, totals))
        .map_err(|e| Error::io(&path, std::io::Error::other(e)))?;
    std::fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}
