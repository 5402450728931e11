// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing with clap derive.

use std::path::PathBuf;

use anstyle::{AnsiColor, Effects, Style};
use clap::builder::Styles;
use clap::{Parser, Subcommand};

use crate::color::ColorMode;
use crate::config::Config;

const STYLES: Styles = Styles::styled()
    .header(Style::new().effects(Effects::BOLD))
    .usage(Style::new().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default())
    .placeholder(AnsiColor::Yellow.on_default())
    .error(AnsiColor::Red.on_default().effects(Effects::BOLD));

/// Discover tests, run them in isolation and gate the run on coverage
#[derive(Parser)]
#[command(name = "testgate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true, styles = STYLES)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Use specific config file
    #[arg(short = 'C', long = "config", global = true, env = "TESTGATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `run` command
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run tests and enforce coverage thresholds (default)
    Run(RunArgs),
    /// List discovered test units without running them
    List(ListArgs),
    /// Validate configuration and exit
    Config,
}

#[derive(clap::Args, Default)]
pub struct RunArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    /// Color output mode
    #[arg(long, default_value = "auto", value_name = "WHEN")]
    pub color: ColorMode,

    /// Disable color output (shorthand for --color=never)
    #[arg(long)]
    pub no_color: bool,

    /// Maximum number of units run concurrently
    #[arg(short = 'w', long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// Per-unit timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Collect coverage and enforce thresholds
    #[arg(long, overrides_with = "no_coverage")]
    pub coverage: bool,

    /// Do not collect coverage
    #[arg(long, overrides_with = "coverage")]
    pub no_coverage: bool,

    /// Succeed when no tests are found
    #[arg(long)]
    pub pass_with_no_tests: bool,

    /// Stop after N units fail or error
    #[arg(long, value_name = "N")]
    pub bail: Option<usize>,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of the file config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(n) = self.max_workers {
            config.max_workers = Some(n);
        }
        if let Some(ms) = self.timeout {
            config.test_timeout = ms;
        }
        if self.coverage {
            config.collect_coverage = true;
        }
        if self.no_coverage {
            config.collect_coverage = false;
        }
        if self.pass_with_no_tests {
            config.pass_with_no_tests = true;
        }
        if let Some(n) = self.bail {
            config.bail = n;
        }
    }
}

#[derive(clap::Args, Default)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    /// Succeed when no tests are found
    #[arg(long)]
    pub pass_with_no_tests: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
