//! # chanlint-cli: Command-Line Interface
//!
//! The `chanlint` binary: argument parsing, configuration layering and the
//! check pipeline. Domain logic lives in the library crates; this crate wires
//! them together.
//!
//! ## Crate Policy
//!
//! - Argument parsing ([`args`]) is separated from orchestration ([`pipeline`]).
//! - Handlers return `anyhow::Result<u8>`; the binary maps the code to the
//!   process exit status.

pub mod args;
pub mod pipeline;

use tokio::sync::watch;

use args::Cli;
use chanlint_core::ConfigFile;

/// Exit code for configuration and load failures.
pub const EXIT_FATAL: u8 = 2;

/// Resolve configuration, run the pipeline and print the report. Returns the
/// process exit code.
pub fn run_check(cli: &Cli) -> anyhow::Result<u8> {
    let file_layer = match &cli.config {
        Some(path) => ConfigFile::load(path),
        None => Ok(ConfigFile::default()),
    };
    let config = match file_layer.and_then(|file| file.merge(cli.check.to_layer()).resolve()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            return Ok(EXIT_FATAL);
        }
    };
    tracing::debug!(?config, "resolved configuration");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(async {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling link check");
                let _ = cancel_tx.send(true);
            }
        });
        pipeline::run(&config, cancel_rx).await
    })?;

    print!("{}", report.render(cli.check.format.into())?);
    Ok(report.exit_code)
}
