// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run pipeline: discovery, execution, coverage aggregation, gating.
//!
//! Coverage is merged by a single pass over the finished results, after
//! every worker has stopped. Abandoned units contribute nothing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use regex::Regex;

use crate::config::{Config, defaults, normalize};
use crate::coverage::{CoverageMap, CoverageTotals, instrument};
use crate::discovery::{self, DiscoveryConfig, TestUnit};
use crate::engine::{
    CancelToken, EngineConfig, ExecutionEngine, ProcessExecutor, RunResults, UnitExecutor,
};
use crate::error::{Error, Result};
use crate::gate::{self, RunVerdict};
use crate::history::DurationHistory;
use crate::report;
use crate::resolver::PathResolver;

/// Everything a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub units: Vec<TestUnit>,
    pub results: RunResults,
    /// Present when coverage was collected.
    pub coverage: Option<CoverageMap>,
    pub totals: Option<CoverageTotals>,
    pub verdict: RunVerdict,
    pub elapsed: Duration,
}

/// Drives one run from a validated config.
pub struct TestRunner<'a> {
    config: &'a Config,
    executor: Arc<dyn UnitExecutor>,
    cancel: CancelToken,
    use_history: bool,
}

impl<'a> TestRunner<'a> {
    /// Runner using the configured unit command.
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            executor: Arc::new(ProcessExecutor::from_config(config)),
            cancel: CancelToken::new(),
            use_history: true,
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn UnitExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Skip reading and writing the duration history.
    pub fn without_history(mut self) -> Self {
        self.use_history = false;
        self
    }

    pub fn run(self) -> Result<RunReport> {
        let started = Instant::now();
        let config = self.config;

        let units = discovery::discover(&DiscoveryConfig::from_config(config))?;
        tracing::info!("discovered {} unit(s)", units.len());

        let resolver = Arc::new(PathResolver::from_config(config)?);
        let history_path = config.cache_dir().join(defaults::cache::DURATIONS_FILE);
        let mut engine = ExecutionEngine::new(
            EngineConfig::from_config(config),
            resolver,
            Arc::clone(&self.executor),
        )
        .with_cancel(self.cancel.clone());
        let mut history = None;
        if self.use_history {
            let loaded = DurationHistory::load_or_default(&history_path);
            engine = engine.with_history(loaded.clone());
            history = Some(loaded);
        }

        let results = engine.run_all(&units);

        if let Some(mut history) = history {
            history.record(&results.results);
            history.retain_units(&units);
            if let Err(e) = history.save(&history_path) {
                tracing::warn!("cannot save duration history: {}", e);
            }
        }

        let (coverage, totals, verdict) = if config.collect_coverage {
            let map = aggregate(config, &units, &results)?;
            let totals = map.totals();
            report::write_coverage_summary(&config.coverage_dir(), &map, &totals)?;
            let verdict = gate::evaluate(&totals, &config.coverage_threshold.global);
            (Some(map), Some(totals), verdict)
        } else {
            (None, None, RunVerdict::without_coverage())
        };
        let verdict = verdict.with_unit_outcomes(results.non_passing(), results.abandoned.len());

        Ok(RunReport {
            units,
            results,
            coverage,
            totals,
            verdict,
            elapsed: started.elapsed(),
        })
    }
}

/// Merge unit samples into one map and apply the coverage file filters.
///
/// With `collect_coverage_from` set, only matching files are kept, and
/// matching files no unit touched are added with zero hits. Test files
/// themselves are never counted as source.
pub fn aggregate(config: &Config, units: &[TestUnit], results: &RunResults) -> Result<CoverageMap> {
    let mut map = CoverageMap::new();
    for sample in results.samples() {
        map.merge(sample);
    }

    let unit_paths: HashSet<PathBuf> = units.iter().map(|u| normalize(&u.path)).collect();

    let ignore = config
        .coverage_path_ignore_patterns
        .iter()
        .map(|p| {
            Regex::new(&config.expand_root(p))
                .map_err(|e| Error::config(format!("invalid regex '{p}': {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    let ignored = |path: &Path| {
        let text = path.to_string_lossy();
        unit_paths.contains(path) || ignore.iter().any(|re| re.is_match(&text))
    };

    if !config.collect_coverage_from.is_empty() {
        let include = discovery::build_glob_set(&config.collect_coverage_from)?;
        let root = &config.root_dir;
        map.retain(|path| include.is_match(path.strip_prefix(root).unwrap_or(path)));

        let untested: Vec<_> = instrument::collect_sources(root, &include, &config.prune_dirs)
            .into_iter()
            .filter(|path| !map.contains(path) && !ignored(path))
            .collect();
        tracing::debug!("{} untested source file(s) added to coverage", untested.len());
        map.include_untested(instrument::inventory(&untested));
    }

    map.retain(|path| !ignored(path));
    Ok(map)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
