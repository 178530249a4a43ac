//! # Envelope Schemas
//!
//! The top-level shape of both document kinds is described by the JSON
//! Schema files in `schemas/`, compiled into the binary and evaluated with
//! the `jsonschema` crate (Draft 2020-12).
//!
//! The envelopes accept unknown keys; the rule engine reports those as
//! warnings.

use std::cmp::Ordering;

use chanlint_core::{DocumentKind, Location, ValidationIssue};
use jsonschema::Validator;
use serde_json::Value;

use crate::SchemaError;

const CHANNEL_SCHEMA_NAME: &str = "channel.schema.json";
const REPOSITORY_SCHEMA_NAME: &str = "repository.schema.json";

const CHANNEL_SCHEMA: &str = include_str!("../schemas/channel.schema.json");
const REPOSITORY_SCHEMA: &str = include_str!("../schemas/repository.schema.json");

/// Compiled envelope validators for both document kinds.
pub struct Envelope {
    channel: Validator,
    repository: Validator,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("channel", &CHANNEL_SCHEMA_NAME)
            .field("repository", &REPOSITORY_SCHEMA_NAME)
            .finish()
    }
}

impl Envelope {
    /// Parse and compile the embedded schemas.
    pub fn new() -> Result<Self, SchemaError> {
        Ok(Self {
            channel: compile(CHANNEL_SCHEMA_NAME, CHANNEL_SCHEMA)?,
            repository: compile(REPOSITORY_SCHEMA_NAME, REPOSITORY_SCHEMA)?,
        })
    }

    /// Check a whole document against its envelope.
    pub fn check(&self, kind: DocumentKind, document: &str, value: &Value) -> Vec<ValidationIssue> {
        self.check_at(kind, document, &Location::root(), value)
    }

    /// Check a value embedded at `base` (an inline repository inside a
    /// channel) against the envelope of `kind`.
    ///
    /// Violations are sorted by location so their order does not depend on
    /// the validator's internal keyword order.
    pub fn check_at(
        &self,
        kind: DocumentKind,
        document: &str,
        base: &Location,
        value: &Value,
    ) -> Vec<ValidationIssue> {
        let validator = match kind {
            DocumentKind::Channel => &self.channel,
            DocumentKind::Repository => &self.repository,
        };

        let mut issues: Vec<ValidationIssue> = validator
            .iter_errors(value)
            .map(|e| {
                let pointer = format!("{}{}", base.as_str(), e.instance_path);
                ValidationIssue::error(document, Location::from_pointer(pointer), e.to_string())
            })
            .collect();

        issues.sort_by(|a, b| {
            compare_pointers(a.location.as_str(), b.location.as_str())
                .then_with(|| a.message.cmp(&b.message))
        });
        issues
    }
}

fn compile(name: &'static str, source: &str) -> Result<Validator, SchemaError> {
    let schema: Value = serde_json::from_str(source).map_err(|e| SchemaError::Parse {
        name,
        reason: e.to_string(),
    })?;
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.build(&schema).map_err(|e| SchemaError::Build {
        name,
        reason: e.to_string(),
    })
}

/// Order JSON Pointers segment by segment, numeric segments numerically,
/// so `/packages/2` sorts before `/packages/10`.
fn compare_pointers(a: &str, b: &str) -> Ordering {
    let mut left = a.split('/');
    let mut right = b.split('/');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<usize>(), y.parse::<usize>()) {
                    (Ok(n), Ok(m)) => n.cmp(&m),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
