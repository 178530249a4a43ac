//! # Check Pipeline
//!
//! Channel → channel validation → link check (when enabled) → validation of
//! each reachable remote repository → report. The main repository and its
//! local includes are loaded and validated independently of the channel.
//!
//! Every step records into one [`ReportBuilder`]; nothing short of an
//! unusable HTTP client aborts the run.

use std::path::Path;

use anyhow::Context;
use chanlint_core::load::{load_file, locate, resolve_include};
use chanlint_core::{DocumentKind, LoadedDocument, RunConfig};
use chanlint_remote::{remote_references, LinkChecker};
use chanlint_report::{Report, ReportBuilder, SkipNote};
use chanlint_schema::{Origin, RepositoryScope, SchemaValidator};
use tokio::sync::watch;

/// Run every configured check and build the report.
///
/// `cancel` aborts the link check when it flips to `true`; URLs still in
/// flight are reported as indeterminate.
pub async fn run(config: &RunConfig, cancel: watch::Receiver<bool>) -> anyhow::Result<Report> {
    let validator = SchemaValidator::new().context("compiling embedded schemas")?;
    let mut report = ReportBuilder::new();

    let channel = match &config.channel {
        Some(path) => load_input(&mut report, path, DocumentKind::Channel),
        None => {
            report.skip(SkipNote::Disabled {
                kind: DocumentKind::Channel,
            });
            None
        }
    };
    if let Some(doc) = &channel {
        report.add_issues(&doc.identity(), validator.validate_channel(doc));
    }

    match &config.repository {
        Some(path) => {
            if let Some(doc) = load_input(&mut report, path, DocumentKind::Repository) {
                check_main_repository(&mut report, &validator, path, &doc);
            }
        }
        None => report.skip(SkipNote::Disabled {
            kind: DocumentKind::Repository,
        }),
    }

    if !config.links.enabled {
        report.skip(SkipNote::LinkCheckDisabled);
    } else if let Some(doc) = &channel {
        let roots = remote_references(doc);
        let checker = LinkChecker::new(config.links.clone()).context("building HTTP client")?;
        let outcomes = checker.check(roots, cancel).await;

        for outcome in &outcomes {
            if let Some(remote) = &outcome.document {
                report.add_issues(&remote.identity(), validator.validate(remote));
            }
        }
        report.add_links(outcomes.into_iter().map(|o| o.result));
    }

    let report = report.finish();
    tracing::info!(
        verdict = ?report.verdict,
        errors = report.summary.errors,
        load_failures = report.summary.load_failures,
        "check finished"
    );
    Ok(report)
}

/// Locate and load an input file. A missing file is a skipped check, any
/// other failure a load error.
fn load_input(report: &mut ReportBuilder, path: &Path, kind: DocumentKind) -> Option<LoadedDocument> {
    let Some(found) = locate(path) else {
        tracing::info!(path = %path.display(), kind = %kind, "input not found, skipping");
        report.skip(SkipNote::MissingFile {
            kind,
            path: path.display().to_string(),
        });
        return None;
    };
    match load_file(&found, kind) {
        Ok(doc) => Some(doc),
        Err(e) => {
            report.add_load_error(&e);
            None
        }
    }
}

/// Validate the main repository at `path` and its local includes in one name
/// scope.
fn check_main_repository(report: &mut ReportBuilder, validator: &SchemaValidator, path: &Path, doc: &LoadedDocument) {
    let mut scope = RepositoryScope::new(Origin::Main);
    report.add_issues(
        &doc.identity(),
        validator.validate_repository(doc, &mut scope, false),
    );

    for reference in doc.includes() {
        match load_file(&resolve_include(path, reference), DocumentKind::Repository) {
            Ok(include) => report.add_issues(
                &include.identity(),
                validator.validate_repository(&include, &mut scope, true),
            ),
            Err(e) => report.add_load_error(&e),
        }
    }
    tracing::debug!(
        packages = scope.names().package_count(),
        includes = doc.includes().len(),
        "validated main repository"
    );
}
