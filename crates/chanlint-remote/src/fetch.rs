//! HTTP fetcher for remote repository documents.

use std::time::Duration;

use chanlint_core::{DocumentKind, DocumentSource, LinkCheckConfig, LoadedDocument};
use url::Url;

use crate::error::FetchError;
use crate::retry::retry_once;

/// Per-request settings of the [`Fetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout of each attempt, covering connect, headers and body.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl From<&LinkCheckConfig> for FetchConfig {
    fn from(config: &LinkCheckConfig) -> Self {
        Self {
            timeout: config.timeout,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Downloads and parses repository documents.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build the underlying `reqwest` client.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| FetchError::Client { source })?;
        Ok(Self { client })
    }

    /// Fetch `url` and parse it as a repository document, retrying once on a
    /// transient failure.
    pub async fn fetch(&self, url: &Url) -> Result<LoadedDocument, FetchError> {
        retry_once(url, || self.fetch_once(url)).await
    }

    async fn fetch_once(&self, url: &Url) -> Result<LoadedDocument, FetchError> {
        tracing::debug!(url = %url, "fetching repository");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_transport(url, e))?;

        LoadedDocument::from_bytes(
            DocumentSource::Url(url.clone()),
            DocumentKind::Repository,
            body.to_vec(),
        )
        .map_err(|source| FetchError::Invalid {
            url: url.to_string(),
            source,
        })
    }
}
