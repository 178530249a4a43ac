//! # Error Types
//!
//! The two fatal error classes of a run. Everything else (schema violations,
//! unreachable repositories) is collected as data rather than raised.
//!
//! - [`LoadError`] is fatal for one document: it is skipped, its siblings are
//!   still checked, and the run ends with the load-failure exit code.
//! - [`ConfigError`] is fatal for the whole run and is reported before any
//!   document is read.

use thiserror::Error;

/// A document could not be loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The file does not exist.
    #[error("{path}: file not found")]
    NotFound {
        /// Path as given.
        path: String,
    },

    /// The file exists but could not be read.
    #[error("{path}: cannot read file: {reason}")]
    Io {
        /// Path as given.
        path: String,
        /// Underlying IO error.
        reason: String,
    },

    /// The content is not valid UTF-8.
    #[error("{source_doc}: invalid UTF-8: {reason}")]
    Encoding {
        /// Document identity.
        source_doc: String,
        /// Decoder message.
        reason: String,
    },

    /// The document is empty.
    #[error("{source_doc}: document is empty")]
    Empty {
        /// Document identity.
        source_doc: String,
    },

    /// The content is not well-formed JSON.
    #[error("{source_doc}: could not parse JSON at line {line}, column {column}: {reason}")]
    Parse {
        /// Document identity.
        source_doc: String,
        /// 1-based line of the syntax error.
        line: usize,
        /// 1-based column of the syntax error.
        column: usize,
        /// Parser message.
        reason: String,
    },

    /// An include reference could not be resolved against its parent.
    #[error("{source_doc}: cannot resolve reference \"{reference}\": {reason}")]
    InvalidReference {
        /// Referring document.
        source_doc: String,
        /// The reference as written.
        reference: String,
        /// Resolution failure.
        reason: String,
    },
}

impl LoadError {
    /// Identity of the document that failed to load.
    pub fn document(&self) -> &str {
        match self {
            Self::NotFound { path } | Self::Io { path, .. } => path,
            Self::Encoding { source_doc, .. }
            | Self::Empty { source_doc }
            | Self::Parse { source_doc, .. }
            | Self::InvalidReference { source_doc, .. } => source_doc,
        }
    }
}

/// The run configuration is unusable.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The link checker needs at least one worker.
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    /// A zero timeout would fail every fetch.
    #[error("timeout must be at least 1 second")]
    ZeroTimeout,

    /// Link checking walks the channel, so one must be configured.
    #[error("--test-repositories requires a channel file")]
    LinkCheckWithoutChannel,

    /// A skip-list entry is not a URL.
    #[error("invalid skip URL \"{url}\": {reason}")]
    InvalidSkipUrl {
        /// Entry as given.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("configuration file {path}: {reason}")]
    File {
        /// Path to the configuration file.
        path: String,
        /// Read or parse failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_document_accessor() {
        let e = LoadError::Parse {
            source_doc: "repository.json".into(),
            line: 3,
            column: 7,
            reason: "expected value".into(),
        };
        assert_eq!(e.document(), "repository.json");
        assert!(e.to_string().contains("line 3, column 7"));
    }

    #[test]
    fn config_error_messages_name_the_flag() {
        assert!(ConfigError::LinkCheckWithoutChannel
            .to_string()
            .contains("--test-repositories"));
    }
}
