//! # chanlint-core: Foundational Types for chanlint
//!
//! Every other crate in the workspace depends on `chanlint-core`; it depends
//! on nothing internal.
//!
//! ## Contents
//!
//! - [`document`]: document kinds, sources and the loaded-document container.
//! - [`issue`]: `ValidationIssue`, severities and JSON Pointer locations.
//! - [`error`]: `LoadError` and `ConfigError`, the two fatal error classes.
//! - [`config`]: `RunConfig`, the explicit configuration passed through
//!   the call chain (no ambient or global state).
//! - [`load`]: reading channel/repository documents from the filesystem.
//!
//! ## Crate Policy
//!
//! - No network access. Remote loading lives in `chanlint-remote`.
//! - No `.unwrap()` outside tests.
//! - Issues are immutable once created.

pub mod config;
pub mod document;
pub mod error;
pub mod issue;
pub mod load;

pub use config::{ConfigFile, LinkCheckConfig, RunConfig};
pub use document::{DocumentKind, DocumentSource, LoadedDocument};
pub use error::{ConfigError, LoadError};
pub use issue::{Location, Severity, ValidationIssue};

/// The only schema version accepted for channel and main repository documents.
pub const SCHEMA_VERSION: &str = "3.0.0";
