// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use testgate::cli::{Cli, Command, RunArgs};
use testgate::config::{self, Config};
use testgate::error::{Error, ExitCode};

mod cmd_list;
mod cmd_run;

fn init_logging() {
    let filter = EnvFilter::try_from_env("TESTGATE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> std::process::ExitCode {
    init_logging();

    match run() {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("testgate: {}", e);
            exit_code_for(&e).into()
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    match &cli.command {
        None => cmd_run::run(&cli, &cli.run),
        Some(Command::Run(args)) => cmd_run::run(&cli, args),
        Some(Command::List(args)) => cmd_list::run(&cli, args),
        Some(Command::Config) => check_config(&cli),
    }
}

/// Map an error to its exit code. Library errors carry their own code;
/// anything else is an internal error.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<Error>() {
        Some(e) => e.exit_code(),
        None => ExitCode::InternalError,
    }
}

/// Load the config named by `-C`, or the nearest `testgate.toml`, or the
/// defaults rooted at the working directory.
pub(crate) fn load_config(cli: &Cli, cwd: &Path) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match &cli.config {
        Some(path) => {
            let path = cwd.join(path);
            if !path.exists() {
                return Err(Error::Config {
                    message: format!("config file not found: {}", path.display()),
                    path: Some(path),
                }
                .into());
            }
            Some(path)
        }
        None => config::find_config(cwd),
    };

    let config = match &path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            config::load_with_warnings(path)?
        }
        None => {
            tracing::debug!("no config found, using defaults");
            let mut config = Config::default();
            config.anchor(cwd);
            config
        }
    };
    Ok((config, path))
}

/// Load, apply overrides and validate.
pub(crate) fn resolve_config(cli: &Cli, args: Option<&RunArgs>) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir()?;
    let (mut config, _) = load_config(cli, &cwd)?;
    if let Some(args) = args {
        args.apply(&mut config);
    }
    config.validate()?;
    Ok(config)
}

fn check_config(cli: &Cli) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let (config, path) = load_config(cli, &cwd)?;
    config.validate()?;
    match path {
        Some(path) => println!("{}: OK", path.display()),
        None => println!("no config file found; defaults are valid"),
    }
    Ok(ExitCode::Success)
}
