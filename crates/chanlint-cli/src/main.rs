//! # chanlint entry point
//!
//! Parses arguments, initializes tracing on stderr and runs the check.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use chanlint_cli::args::Cli;
use chanlint_cli::{run_check, EXIT_FATAL};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("chanlint v{} starting", env!("CARGO_PKG_VERSION"));

    match run_check(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}
