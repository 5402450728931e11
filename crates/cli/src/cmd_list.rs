// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! List command implementation.

use std::io::Write;

use testgate::cli::{Cli, ListArgs, OutputFormat};
use testgate::discovery::{self, DiscoveryConfig};
use testgate::error::ExitCode;

/// Print discovered units in discovery order without running them.
pub fn run(cli: &Cli, args: &ListArgs) -> anyhow::Result<ExitCode> {
    let mut config = crate::resolve_config(cli, None)?;
    if args.pass_with_no_tests {
        config.pass_with_no_tests = true;
    }

    let units = discovery::discover(&DiscoveryConfig::from_config(&config))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => {
            for unit in &units {
                writeln!(out, "{}", unit.id)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &units)?;
            writeln!(out)?;
        }
    }
    Ok(ExitCode::Success)
}
