//! # Validation Issues
//!
//! A [`ValidationIssue`] is one finding of the schema validator: which
//! document, where inside it (a JSON Pointer), how bad, and what is wrong.
//! Issues are plain immutable values so the report aggregator can
//! deduplicate and sort them.

use std::fmt;

use serde::{Serialize, Serializer};

/// Issue severity. Only errors fail a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Structural violation; fails the run.
    Error,
    /// Tolerated deviation (unknown keys and the like).
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// JSON Pointer (RFC 6901) into a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(String);

impl Location {
    /// The document root (`""`).
    pub fn root() -> Self {
        Self::default()
    }

    /// Descend into an object member.
    pub fn key(&self, key: &str) -> Self {
        let escaped = key.replace('~', "~0").replace('/', "~1");
        Self(format!("{}/{}", self.0, escaped))
    }

    /// Descend into an array element.
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}/{}", self.0, index))
    }

    /// Raw pointer string (empty for the root).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a location from an existing pointer string.
    pub fn from_pointer(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    /// True for the document root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// One finding of the schema validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ValidationIssue {
    /// Identity of the document the issue was found in.
    pub document: String,
    /// Where inside the document.
    pub location: Location,
    /// Error or warning.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    /// Create an error issue.
    pub fn error(document: impl Into<String>, location: Location, message: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            location,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// Create a warning issue.
    pub fn warning(
        document: impl Into<String>,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            document: document.into(),
            location,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// True if this issue fails the run.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.document, self.location, self.severity, self.message
        )
    }
}
