//! Command-line arguments.

use std::path::PathBuf;

use chanlint_core::ConfigFile;
use chanlint_report::Format;
use clap::{Args, Parser, ValueEnum};

/// Validate a Package Control channel and its repositories.
///
/// Checks `channel.json` and `repository.json` (plus the repository's local
/// includes) in the current directory by default. With
/// `--test-repositories`, every remote repository referenced from the
/// channel is fetched and validated too.
#[derive(Parser, Debug)]
#[command(name = "chanlint", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// YAML configuration file. Command-line flags override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub check: CheckArgs,
}

/// Report format.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// JSON object.
    Json,
}

impl From<OutputFormat> for Format {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Text => Format::Text,
            OutputFormat::Json => Format::Json,
        }
    }
}

/// What to check and how.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Channel file [default: channel.json]. An empty value disables the check.
    #[arg(long)]
    pub channel: Option<String>,

    /// Main repository file [default: repository.json]. An empty value
    /// disables the check.
    #[arg(long)]
    pub repository: Option<String>,

    /// Fetch and validate every remote repository listed in the channel.
    #[arg(long)]
    pub test_repositories: bool,

    /// Number of concurrent fetches [default: 8].
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Timeout of each fetch, in seconds [default: 30].
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Budget for the whole link check, in seconds.
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Repository URL to report as skipped instead of fetching. Repeatable.
    #[arg(long = "skip-url")]
    pub skip_urls: Vec<String>,

    /// User-Agent header for fetches [default: Mozilla/5.0].
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl CheckArgs {
    /// The flags as a configuration layer to merge over the config file.
    pub fn to_layer(&self) -> ConfigFile {
        ConfigFile {
            channel: self.channel.clone(),
            repository: self.repository.clone(),
            test_repositories: self.test_repositories.then_some(true),
            concurrency: self.concurrency,
            timeout_secs: self.timeout_secs,
            deadline_secs: self.deadline_secs,
            skip_urls: self.skip_urls.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}
