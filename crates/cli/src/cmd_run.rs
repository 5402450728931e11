// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run command implementation.

use std::io::Write;

use termcolor::StandardStream;

use testgate::cli::{Cli, RunArgs};
use testgate::config::{Config, defaults};
use testgate::engine::{CancelToken, effective_workers};
use testgate::error::ExitCode;
use testgate::report;
use testgate::runner::{RunReport, TestRunner};
use testgate::verbose::VerboseLogger;

/// Run the test suite and gate it on coverage.
pub fn run(cli: &Cli, args: &RunArgs) -> anyhow::Result<ExitCode> {
    let config = crate::resolve_config(cli, Some(args))?;
    let verbose = VerboseLogger::new(args.verbose);
    log_configuration(&verbose, &config);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        tracing::warn!("cannot install interrupt handler: {}", e);
    }

    let report = TestRunner::new(&config).with_cancel(cancel).run()?;
    log_discovery(&verbose, &report);

    let mut stdout = StandardStream::stdout(args.color.choice(args.no_color));
    report::write_report(args.output, &mut stdout, &report)?;
    stdout.flush()?;

    report_failures(&report);
    Ok(report.verdict.exit_code())
}

fn log_configuration(verbose: &VerboseLogger, config: &Config) {
    if !verbose.is_enabled() {
        return;
    }
    verbose.section("Configuration");
    verbose.log(&format!("Root: {}", config.root_dir.display()));
    let roots: Vec<String> = config
        .root_paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    verbose.list("Roots", &roots);
    verbose.list("Test match", &config.test_match);
    verbose.list("Ignore patterns", &config.test_path_ignore_patterns);
    verbose.list("Runner", &config.runner.command);

    verbose.section("Scheduling");
    verbose.log(&format!("Workers: {}", effective_workers(config.max_workers)));
    verbose.log(&format!("Timeout: {} ms", config.test_timeout));
    if config.bail > 0 {
        verbose.log(&format!("Bail after: {} non-passing unit(s)", config.bail));
    }
    verbose.log(&format!(
        "History: {}",
        config.cache_dir().join(defaults::cache::DURATIONS_FILE).display()
    ));
    verbose.log(&format!(
        "Coverage: {}",
        if config.collect_coverage { "on" } else { "off" }
    ));
}

fn log_discovery(verbose: &VerboseLogger, report: &RunReport) {
    if !verbose.is_enabled() {
        return;
    }
    verbose.section("Discovery");
    let ids: Vec<String> = report.units.iter().map(|u| u.id.to_string()).collect();
    verbose.log(&format!("{} unit(s)", ids.len()));
    verbose.list("Units", &ids);
}

/// Summarize why the run failed on stderr.
fn report_failures(report: &RunReport) {
    let verdict = &report.verdict;
    for violation in &verdict.violations {
        eprintln!("testgate: {}", violation);
    }
    if !verdict.failed_units.is_empty() {
        eprintln!("testgate: {} unit(s) did not pass:", verdict.failed_units.len());
        for id in &verdict.failed_units {
            eprintln!("  {}", id);
        }
    }
    if verdict.abandoned > 0 {
        eprintln!("testgate: {} unit(s) abandoned", verdict.abandoned);
    }
}
