//! Issue accumulator shared by the rule functions.

use chanlint_core::{Location, ValidationIssue};

/// Collects issues for one document, in the order they are raised.
pub(crate) struct Checker<'a> {
    document: &'a str,
    issues: Vec<ValidationIssue>,
}

impl<'a> Checker<'a> {
    pub(crate) fn new(document: &'a str) -> Self {
        Self {
            document,
            issues: Vec::new(),
        }
    }

    pub(crate) fn document(&self) -> &'a str {
        self.document
    }

    pub(crate) fn error(&mut self, location: &Location, message: impl Into<String>) {
        self.issues
            .push(ValidationIssue::error(self.document, location.clone(), message));
    }

    pub(crate) fn warning(&mut self, location: &Location, message: impl Into<String>) {
        self.issues
            .push(ValidationIssue::warning(self.document, location.clone(), message));
    }

    pub(crate) fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.issues.extend(issues);
    }

    pub(crate) fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}
