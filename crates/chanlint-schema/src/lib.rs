//! # chanlint-schema: Channel & Repository Schema Validation
//!
//! Validates loaded documents and returns an ordered list of
//! [`ValidationIssue`](chanlint_core::ValidationIssue)s. Validation never
//! fails: everything it finds is data for the report aggregator.
//!
//! ## Two layers
//!
//! - [`envelope`]: the top-level contract (required keys and their JSON
//!   types) is expressed as JSON Schema documents under `schemas/` and
//!   evaluated with the `jsonschema` crate.
//! - The rule engine (`channel`, [`repository`], [`release`]) walks the
//!   document depth-first in document order and applies the entry-level
//!   rules: name uniqueness, URL formats, release selectors, platform sets.
//!
//! ## Determinism
//!
//! Issue order depends only on the input: envelope violations first (sorted
//! by location), then rule findings in document order. Validating the same
//! input twice yields the same sequence.
//!
//! ## Crate Policy
//!
//! - No IO. Includes and remote repositories are loaded by the caller, which
//!   passes them back in through a shared [`RepositoryScope`].

pub mod envelope;
pub mod names;
pub mod patterns;
pub mod release;
pub mod repository;

mod channel;
mod checker;
mod indent;
mod keys;

use chanlint_core::{DocumentKind, DocumentSource, LoadedDocument, Location, ValidationIssue};
use thiserror::Error;

pub use envelope::Envelope;
pub use names::NameRegistry;
pub use release::ReleaseRules;
pub use repository::{package_name, Origin, RepositoryScope};

use checker::Checker;

/// The embedded schemas could not be compiled.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// An embedded schema is not valid JSON.
    #[error("embedded schema {name} is not valid JSON: {reason}")]
    Parse {
        /// Schema file name.
        name: &'static str,
        /// Parser message.
        reason: String,
    },

    /// An embedded schema could not be compiled into a validator.
    #[error("embedded schema {name} failed to compile: {reason}")]
    Build {
        /// Schema file name.
        name: &'static str,
        /// Compiler message.
        reason: String,
    },
}

/// Validates channel and repository documents.
///
/// `SchemaValidator` is `Send + Sync`; compile it once per run.
#[derive(Debug)]
pub struct SchemaValidator {
    envelope: Envelope,
}

impl SchemaValidator {
    /// Compile the embedded envelope schemas.
    pub fn new() -> Result<Self, SchemaError> {
        Ok(Self {
            envelope: Envelope::new()?,
        })
    }

    /// Validate a document according to its declared kind.
    ///
    /// Repositories get a fresh [`RepositoryScope`]; local files are treated
    /// as the main repository, remote ones with the relaxed rules of
    /// third-party repositories.
    pub fn validate(&self, doc: &LoadedDocument) -> Vec<ValidationIssue> {
        match doc.kind {
            DocumentKind::Channel => self.validate_channel(doc),
            DocumentKind::Repository => {
                let origin = match doc.source {
                    DocumentSource::File(_) => Origin::Main,
                    DocumentSource::Url(_) => Origin::Remote,
                };
                let mut scope = RepositoryScope::new(origin);
                self.validate_repository(doc, &mut scope, false)
            }
        }
    }

    /// Validate a channel document.
    pub fn validate_channel(&self, doc: &LoadedDocument) -> Vec<ValidationIssue> {
        let identity = doc.identity();
        let mut issues = self.envelope.check(DocumentKind::Channel, &identity, &doc.value);

        let mut ck = Checker::new(&identity);
        if !doc.source.is_remote() {
            indent::check(&mut ck, &doc.text);
        }
        channel::check_channel(&mut ck, &self.envelope, &doc.value);
        issues.extend(ck.into_issues());

        tracing::debug!(document = %identity, issues = issues.len(), "validated channel");
        issues
    }

    /// Validate a repository document within `scope`.
    ///
    /// Pass the same scope for a repository and all of its includes so
    /// names are checked for uniqueness across the set. `is_include` turns
    /// on the include layout rules (file naming, letter placement, sort
    /// order) for main-repository includes.
    pub fn validate_repository(
        &self,
        doc: &LoadedDocument,
        scope: &mut RepositoryScope,
        is_include: bool,
    ) -> Vec<ValidationIssue> {
        let identity = doc.identity();
        let mut issues = self
            .envelope
            .check(DocumentKind::Repository, &identity, &doc.value);

        let mut ck = Checker::new(&identity);
        if !doc.source.is_remote() {
            indent::check(&mut ck, &doc.text);
        }
        repository::check_repository(&mut ck, scope, &Location::root(), &doc.value, is_include);
        issues.extend(ck.into_issues());

        tracing::debug!(
            document = %identity,
            origin = ?scope.origin(),
            include = is_include,
            issues = issues.len(),
            "validated repository"
        );
        issues
    }
}
