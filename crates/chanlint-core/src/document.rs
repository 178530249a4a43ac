//! # Documents
//!
//! A run loads a handful of JSON documents: the channel, the main repository
//! file, its local includes and, when link checking is enabled, every remote
//! repository referenced from the channel. Each one is identified by its
//! [`DocumentSource`], whose display form is the document identity printed in
//! reports.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use serde_json::Value;
use url::Url;

use crate::error::LoadError;

/// The two document kinds understood by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Top-level index listing repository sources.
    Channel,
    /// Document listing packages, dependencies and includes.
    Repository,
}

impl DocumentKind {
    /// Lowercase name used in log fields and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::Repository => "repository",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a document came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentSource {
    /// A file on the local filesystem.
    File(PathBuf),
    /// A remote document fetched over HTTP(S).
    Url(Url),
}

impl DocumentSource {
    /// Returns true for documents fetched over the network.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// Resolve an `includes` reference relative to this document.
    ///
    /// Local documents resolve against their parent directory; remote
    /// documents use URL joining, so `./a.json` next to
    /// `https://host/repo/repository.json` becomes `https://host/repo/a.json`.
    pub fn resolve(&self, reference: &str) -> Result<DocumentSource, LoadError> {
        match self {
            Self::File(path) => {
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(Self::File(base.join(reference)))
            }
            Self::Url(url) => url
                .join(reference)
                .map(Self::Url)
                .map_err(|e| LoadError::InvalidReference {
                    source_doc: self.to_string(),
                    reference: reference.to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url.as_str()),
        }
    }
}

impl Serialize for DocumentSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A successfully parsed document, ready for schema validation.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Document identity.
    pub source: DocumentSource,
    /// Declared kind.
    pub kind: DocumentKind,
    /// Raw UTF-8 text, kept for the indentation rule.
    pub text: String,
    /// Parsed JSON.
    pub value: Value,
}

impl LoadedDocument {
    /// Decode and parse a document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Encoding`] for invalid UTF-8, [`LoadError::Empty`]
    /// for an empty body and [`LoadError::Parse`] for malformed JSON.
    pub fn from_bytes(
        source: DocumentSource,
        kind: DocumentKind,
        bytes: Vec<u8>,
    ) -> Result<Self, LoadError> {
        let text = String::from_utf8(bytes).map_err(|e| LoadError::Encoding {
            source_doc: source.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_text(source, kind, text)
    }

    /// Parse a document from already decoded text.
    pub fn from_text(
        source: DocumentSource,
        kind: DocumentKind,
        text: String,
    ) -> Result<Self, LoadError> {
        if text.trim().is_empty() {
            return Err(LoadError::Empty {
                source_doc: source.to_string(),
            });
        }
        let value: Value = serde_json::from_str(&text).map_err(|e| LoadError::Parse {
            source_doc: source.to_string(),
            line: e.line(),
            column: e.column(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source,
            kind,
            text,
            value,
        })
    }

    /// Document identity as printed in reports.
    pub fn identity(&self) -> String {
        self.source.to_string()
    }

    /// The `schema_version` marker, as written. Old repositories used JSON
    /// numbers, so those are rendered to text.
    pub fn schema_version(&self) -> Option<String> {
        match self.value.get("schema_version")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// String entries of a repository's `includes` array.
    pub fn includes(&self) -> Vec<&str> {
        string_entries(&self.value, "includes")
    }

    /// String entries of a channel's `repositories` array. Inline
    /// repository objects are not references and are left out.
    pub fn repository_references(&self) -> Vec<&str> {
        string_entries(&self.value, "repositories")
    }
}

fn string_entries<'a>(value: &'a Value, key: &str) -> Vec<&'a str> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
