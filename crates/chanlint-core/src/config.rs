//! # Run Configuration
//!
//! A run is fully described by a [`RunConfig`], built once at startup and
//! passed explicitly down the call chain. Components never read flags or
//! environment variables themselves, so each can be unit-tested in isolation.
//!
//! Settings come from two layers, both shaped as a [`ConfigFile`]:
//!
//! 1. an optional YAML configuration file;
//! 2. command-line flags, which override the file.
//!
//! [`ConfigFile::resolve`] applies defaults and validates the result.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Default channel file name.
pub const DEFAULT_CHANNEL: &str = "channel.json";

/// Default repository file name.
pub const DEFAULT_REPOSITORY: &str = "repository.json";

/// Default size of the link-checker worker pool.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Some hosts reject requests without a browser-like agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Repositories known to be broken upstream. They are reported as skipped
/// instead of being fetched.
pub const KNOWN_BAD_REPOSITORIES: &[&str] = &[
    "https://packages.monokai.pro/packages.json",
    "https://raw.githubusercontent.com/blake-regalia/linked-data.syntaxes/master/channels/sublime/package-control.json",
];

/// Settings of the repository link checker.
#[derive(Debug, Clone)]
pub struct LinkCheckConfig {
    /// Whether remote repositories are fetched at all.
    pub enabled: bool,
    /// Worker pool size.
    pub concurrency: usize,
    /// Independent timeout of each fetch attempt.
    pub timeout: Duration,
    /// Optional budget for the whole link check; anything unfinished when it
    /// expires is reported as indeterminate.
    pub deadline: Option<Duration>,
    /// URLs reported as skipped without fetching.
    pub skip_urls: Vec<Url>,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for LinkCheckConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            deadline: None,
            skip_urls: Vec::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl LinkCheckConfig {
    /// True if `url` is on the skip list.
    pub fn is_skipped(&self, url: &Url) -> bool {
        self.skip_urls.iter().any(|s| s == url)
    }
}

/// Fully resolved configuration of one run.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Channel file; `None` disables the channel check.
    pub channel: Option<PathBuf>,
    /// Main repository file; `None` disables the repository check.
    pub repository: Option<PathBuf>,
    /// Link checker settings.
    pub links: LinkCheckConfig,
}

impl RunConfig {
    /// Check flag combinations. Called before any document is read.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.links.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.links.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.links.enabled && self.channel.is_none() {
            return Err(ConfigError::LinkCheckWithoutChannel);
        }
        Ok(())
    }
}

/// One configuration layer. Every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Channel file path; an empty string disables the check.
    pub channel: Option<String>,
    /// Repository file path; an empty string disables the check.
    pub repository: Option<String>,
    /// Enable remote repository link checking.
    pub test_repositories: Option<bool>,
    /// Worker pool size.
    pub concurrency: Option<usize>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Overall link-check budget in seconds.
    pub deadline_secs: Option<u64>,
    /// Additional URLs to skip.
    pub skip_urls: Vec<String>,
    /// `User-Agent` override.
    pub user_agent: Option<String>,
}

impl ConfigFile {
    /// Read a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            ConfigError::File { reason, .. } => ConfigError::File {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parse a YAML configuration layer.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::File {
            path: "<inline>".to_string(),
            reason: format!("invalid YAML: {e}"),
        })
    }

    /// Overlay `other` on top of `self`: set fields of `other` win,
    /// skip lists are concatenated.
    pub fn merge(mut self, other: ConfigFile) -> ConfigFile {
        self.channel = other.channel.or(self.channel);
        self.repository = other.repository.or(self.repository);
        self.test_repositories = other.test_repositories.or(self.test_repositories);
        self.concurrency = other.concurrency.or(self.concurrency);
        self.timeout_secs = other.timeout_secs.or(self.timeout_secs);
        self.deadline_secs = other.deadline_secs.or(self.deadline_secs);
        self.user_agent = other.user_agent.or(self.user_agent);
        self.skip_urls.extend(other.skip_urls);
        self
    }

    /// Apply defaults, parse URLs and validate the combination.
    pub fn resolve(self) -> Result<RunConfig, ConfigError> {
        let mut skip_urls = Vec::new();
        for raw in KNOWN_BAD_REPOSITORIES
            .iter()
            .map(|s| s.to_string())
            .chain(self.skip_urls)
        {
            let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidSkipUrl {
                url: raw.clone(),
                reason: e.to_string(),
            })?;
            if !skip_urls.contains(&url) {
                skip_urls.push(url);
            }
        }

        let config = RunConfig {
            channel: optional_path(self.channel, DEFAULT_CHANNEL),
            repository: optional_path(self.repository, DEFAULT_REPOSITORY),
            links: LinkCheckConfig {
                enabled: self.test_repositories.unwrap_or(false),
                concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
                timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
                deadline: self.deadline_secs.map(Duration::from_secs),
                skip_urls,
                user_agent: self
                    .user_agent
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

fn optional_path(value: Option<String>, default: &str) -> Option<PathBuf> {
    match value {
        Some(s) if s.trim().is_empty() => None,
        Some(s) => Some(PathBuf::from(s)),
        None => Some(PathBuf::from(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_conventional_file_names() {
        let cfg = ConfigFile::default().resolve().unwrap();
        assert_eq!(cfg.channel, Some(PathBuf::from("channel.json")));
        assert_eq!(cfg.repository, Some(PathBuf::from("repository.json")));
        assert!(!cfg.links.enabled);
        assert_eq!(cfg.links.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(cfg.links.skip_urls.len(), KNOWN_BAD_REPOSITORIES.len());
    }

    #[test]
    fn empty_path_disables_check() {
        let cfg = ConfigFile {
            channel: Some(String::new()),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert!(cfg.channel.is_none());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let err = ConfigFile {
            concurrency: Some(0),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroConcurrency));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ConfigFile {
            timeout_secs: Some(0),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout));
    }

    #[test]
    fn link_check_needs_channel() {
        let err = ConfigFile {
            channel: Some(String::new()),
            test_repositories: Some(true),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, ConfigError::LinkCheckWithoutChannel));
    }

    #[test]
    fn invalid_skip_url_rejected() {
        let err = ConfigFile {
            skip_urls: vec!["not a url".into()],
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSkipUrl { .. }));
    }

    #[test]
    fn flags_override_file_layer() {
        let file = ConfigFile::from_yaml_str(
            "channel: ch.json\nconcurrency: 2\nskip_urls:\n  - https://a.example/r.json\n",
        )
        .unwrap();
        let flags = ConfigFile {
            concurrency: Some(4),
            skip_urls: vec!["https://b.example/r.json".into()],
            ..Default::default()
        };
        let cfg = file.merge(flags).resolve().unwrap();
        assert_eq!(cfg.channel, Some(PathBuf::from("ch.json")));
        assert_eq!(cfg.links.concurrency, 4);
        assert!(cfg
            .links
            .is_skipped(&Url::parse("https://a.example/r.json").unwrap()));
        assert!(cfg
            .links
            .is_skipped(&Url::parse("https://b.example/r.json").unwrap()));
    }

    #[test]
    fn unknown_config_key_rejected() {
        let err = ConfigFile::from_yaml_str("chanel: typo.json\n").unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chanlint.yaml");
        std::fs::write(&path, "concurrency: [1]\n").unwrap();
        match ConfigFile::load(&path).unwrap_err() {
            ConfigError::File { path: p, .. } => assert!(p.ends_with("chanlint.yaml")),
            other => panic!("expected File error, got {other}"),
        }
    }
}
