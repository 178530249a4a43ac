//! Link-check error types.

use chanlint_core::LoadError;

/// Errors from fetching a remote repository document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// Underlying builder error.
        source: reqwest::Error,
    },

    /// The request or body read exceeded the per-request timeout.
    #[error("timeout fetching {url}")]
    Timeout {
        /// Requested URL.
        url: String,
    },

    /// TCP/TLS connection could not be established.
    #[error("connection to {url} failed: {source}")]
    Connect {
        /// Requested URL.
        url: String,
        /// Transport error.
        source: reqwest::Error,
    },

    /// The request could not be built, or the redirect limit was hit.
    /// Repeating it gives the same answer.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL.
        url: String,
        /// Builder or redirect error.
        source: reqwest::Error,
    },

    /// Any other transport failure while sending the request or reading the
    /// body (connection reset, truncated body).
    #[error("HTTP error fetching {url}: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Transport error.
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// The body is not a parseable JSON document.
    #[error("{url} is not a valid repository document: {source}")]
    Invalid {
        /// Requested URL.
        url: String,
        /// Why decoding or parsing failed.
        source: LoadError,
    },
}

impl FetchError {
    /// Classify a `reqwest` transport error.
    pub(crate) fn from_transport(url: &url::Url, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            Self::Timeout { url }
        } else if source.is_connect() {
            Self::Connect { url, source }
        } else if source.is_builder() || source.is_redirect() {
            Self::Request { url, source }
        } else {
            Self::Transport { url, source }
        }
    }

    /// True for failures worth one more attempt. HTTP statuses and bad
    /// bodies are answers from the server and are never retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connect { .. } | Self::Transport { .. }
        )
    }

    /// Short reason shown in the report next to the URL.
    pub fn detail(&self) -> String {
        match self {
            Self::Client { source } => format!("client error: {source}"),
            Self::Timeout { .. } => "timeout".to_string(),
            Self::Connect { source, .. } => format!("connection failed: {source}"),
            Self::Request { source, .. } => format!("request error: {source}"),
            Self::Transport { source, .. } => format!("transport error: {source}"),
            Self::Status { status, .. } => format!("HTTP {status}"),
            Self::Invalid { source, .. } => format!("invalid document: {source}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_invalid_are_not_transient() {
        let status = FetchError::Status {
            url: "https://x.example/r.json".into(),
            status: 503,
        };
        assert!(!status.is_transient());
        assert_eq!(status.detail(), "HTTP 503");

        let invalid = FetchError::Invalid {
            url: "https://x.example/r.json".into(),
            source: LoadError::Empty {
                source_doc: "https://x.example/r.json".into(),
            },
        };
        assert!(!invalid.is_transient());
        assert!(invalid.detail().starts_with("invalid document"));
    }

    #[test]
    fn builder_errors_are_not_retried() {
        let url = url::Url::parse("https://x.example/r.json").unwrap();
        let source = reqwest::Client::new().get("not a url").build().unwrap_err();
        assert!(source.is_builder());

        let err = FetchError::from_transport(&url, source);
        assert!(matches!(err, FetchError::Request { .. }), "{err:?}");
        assert!(!err.is_transient());
        assert!(err.detail().starts_with("request error"));
    }

    #[test]
    fn timeout_detail_is_stable() {
        let err = FetchError::Timeout {
            url: "https://x.example/r.json".into(),
        };
        assert!(err.is_transient());
        assert_eq!(err.detail(), "timeout");
        assert_eq!(err.to_string(), "timeout fetching https://x.example/r.json");
    }
}
