//! Collecting findings into a [`Report`].

use std::collections::{BTreeMap, HashSet};

use chanlint_core::{DocumentKind, LoadError, Location, ValidationIssue};
use chanlint_remote::{LinkCheckResult, LinkStatus};
use serde::Serialize;

/// A check that did not run, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipNote {
    /// The input path was disabled with an empty value.
    Disabled {
        /// Which input.
        kind: DocumentKind,
    },
    /// The input path does not name an existing file.
    MissingFile {
        /// Which input.
        kind: DocumentKind,
        /// Path as configured.
        path: String,
    },
    /// Link checking was not requested.
    LinkCheckDisabled,
    /// Remote repositories skipped because they are known to be broken.
    KnownBroken {
        /// Number of repositories.
        count: usize,
    },
    /// Remote repositories skipped because of a legacy schema version.
    LegacySchema {
        /// The declared schema version.
        version: String,
        /// Number of repositories.
        count: usize,
    },
}

impl std::fmt::Display for SkipNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled { kind } => write!(f, "{kind} check disabled"),
            Self::MissingFile { kind, path } => {
                write!(f, "{kind} check skipped: \"{path}\" does not exist")
            }
            Self::LinkCheckDisabled => f.write_str("repository link check not enabled"),
            Self::KnownBroken { count } => {
                write!(f, "{count} known broken repositories not checked")
            }
            Self::LegacySchema { version, count } => {
                write!(f, "{count} repositories with schema version {version} not checked")
            }
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No errors.
    Pass,
    /// Validation errors or failed links.
    Fail,
    /// At least one document could not be loaded.
    LoadFailure,
}

impl Verdict {
    /// Process exit code: 0 pass, 1 validation failure, 2 load failure.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
            Self::LoadFailure => 2,
        }
    }
}

/// Issues of one document, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentIssues {
    /// Document identity.
    pub document: String,
    /// Deduplicated issues.
    pub issues: Vec<ValidationIssue>,
}

/// A document that failed to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    /// Document identity.
    pub document: String,
    /// Loader message.
    pub message: String,
}

/// Counters shown on the summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Documents validated.
    pub documents: usize,
    /// Error issues.
    pub errors: usize,
    /// Warning issues.
    pub warnings: usize,
    /// Documents that failed to load.
    pub load_failures: usize,
    /// Links checked, including skipped ones.
    pub links: usize,
    /// Links that failed (unreachable or indeterminate).
    pub failed_links: usize,
    /// Links skipped.
    pub skipped_links: usize,
}

/// The final, immutable result of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Overall verdict.
    pub verdict: Verdict,
    /// Exit code derived from the verdict.
    pub exit_code: u8,
    /// Issues grouped by document. Documents without issues are omitted.
    pub documents: Vec<DocumentIssues>,
    /// Load failures, in submission order.
    pub load_failures: Vec<LoadFailure>,
    /// Link results sorted by URL; empty when link checking is off.
    pub links: Vec<LinkCheckResult>,
    /// Checks that did not run.
    pub skipped: Vec<SkipNote>,
    /// Counters.
    pub summary: Summary,
}

/// Accumulates findings while the pipeline runs.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    order: Vec<String>,
    issues: BTreeMap<usize, Vec<ValidationIssue>>,
    seen: HashSet<(String, Location, String)>,
    load_failures: Vec<LoadFailure>,
    links: Vec<LinkCheckResult>,
    skipped: Vec<SkipNote>,
}

impl ReportBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, document: &str) -> usize {
        match self.order.iter().position(|d| d == document) {
            Some(i) => i,
            None => {
                self.order.push(document.to_string());
                self.order.len() - 1
            }
        }
    }

    /// Record that `document` was validated, and its issues. Identical
    /// issues (same document, location and message) are kept once.
    pub fn add_issues(&mut self, document: &str, issues: impl IntoIterator<Item = ValidationIssue>) {
        let slot = self.slot(document);
        let bucket = self.issues.entry(slot).or_default();
        for issue in issues {
            let key = (
                issue.document.clone(),
                issue.location.clone(),
                issue.message.clone(),
            );
            if self.seen.insert(key) {
                bucket.push(issue);
            } else {
                tracing::trace!(%issue, "dropping duplicate issue");
            }
        }
    }

    /// Record a document that could not be loaded.
    pub fn add_load_error(&mut self, error: &LoadError) {
        tracing::debug!(document = error.document(), %error, "load failure");
        self.load_failures.push(LoadFailure {
            document: error.document().to_string(),
            message: error.to_string(),
        });
    }

    /// Record link check results.
    pub fn add_links(&mut self, results: impl IntoIterator<Item = LinkCheckResult>) {
        self.links.extend(results);
    }

    /// Record a check that did not run.
    pub fn skip(&mut self, note: SkipNote) {
        self.skipped.push(note);
    }

    /// Derive the verdict and freeze the report.
    pub fn finish(mut self) -> Report {
        self.links.sort_by(|a, b| a.url.cmp(&b.url));
        self.skipped.extend(link_skip_notes(&self.links));

        let documents: Vec<DocumentIssues> = self
            .issues
            .into_iter()
            .filter(|(_, issues)| !issues.is_empty())
            .map(|(slot, issues)| DocumentIssues {
                document: self.order[slot].clone(),
                issues,
            })
            .collect();

        let all = documents.iter().flat_map(|d| d.issues.iter());
        let errors = all.clone().filter(|i| i.is_error()).count();
        let warnings = all.count() - errors;
        let failed_links = self.links.iter().filter(|l| l.status.is_failure()).count();
        let summary = Summary {
            documents: self.order.len(),
            errors,
            warnings,
            load_failures: self.load_failures.len(),
            links: self.links.len(),
            failed_links,
            skipped_links: self
                .links
                .iter()
                .filter(|l| l.status == LinkStatus::Skipped)
                .count(),
        };

        let verdict = if summary.load_failures > 0 {
            Verdict::LoadFailure
        } else if summary.errors > 0 || summary.failed_links > 0 {
            Verdict::Fail
        } else {
            Verdict::Pass
        };

        Report {
            verdict,
            exit_code: verdict.exit_code(),
            documents,
            load_failures: self.load_failures,
            links: self.links,
            skipped: self.skipped,
            summary,
        }
    }
}

fn link_skip_notes(links: &[LinkCheckResult]) -> Vec<SkipNote> {
    let mut notes = Vec::new();
    let mut legacy: BTreeMap<String, usize> = BTreeMap::new();
    let mut broken = 0;
    for link in links.iter().filter(|l| l.status == LinkStatus::Skipped) {
        match &link.schema_version {
            Some(version) => *legacy.entry(version.clone()).or_default() += 1,
            None => broken += 1,
        }
    }
    if broken > 0 {
        notes.push(SkipNote::KnownBroken { count: broken });
    }
    notes.extend(
        legacy
            .into_iter()
            .map(|(version, count)| SkipNote::LegacySchema { version, count }),
    );
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn link(url: &str, status: LinkStatus, version: Option<&str>) -> LinkCheckResult {
        LinkCheckResult {
            url: Url::parse(url).unwrap(),
            status,
            detail: None,
            schema_version: version.map(str::to_string),
        }
    }

    #[test]
    fn empty_run_passes() {
        let report = ReportBuilder::new().finish();
        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(report.exit_code, 0);
    }

    #[test]
    fn duplicates_are_dropped() {
        let mut b = ReportBuilder::new();
        let issue = ValidationIssue::error("r.json", Location::root().key("packages"), "bad");
        b.add_issues("r.json", vec![issue.clone(), issue.clone()]);
        b.add_issues("r.json", vec![issue]);
        let report = b.finish();
        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].issues.len(), 1);
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn warnings_never_fail() {
        let mut b = ReportBuilder::new();
        b.add_issues(
            "c.json",
            vec![ValidationIssue::warning("c.json", Location::root().key("x"), "unexpected key")],
        );
        let report = b.finish();
        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(report.summary.warnings, 1);
    }

    #[test]
    fn load_failure_takes_precedence() {
        let mut b = ReportBuilder::new();
        b.add_issues(
            "c.json",
            vec![ValidationIssue::error("c.json", Location::root(), "bad")],
        );
        b.add_load_error(&LoadError::Empty {
            source_doc: "r.json".into(),
        });
        let report = b.finish();
        assert_eq!(report.verdict, Verdict::LoadFailure);
        assert_eq!(report.exit_code, 2);
    }

    #[test]
    fn documents_keep_submission_order() {
        let mut b = ReportBuilder::new();
        b.add_issues("z.json", vec![ValidationIssue::warning("z.json", Location::root(), "w")]);
        b.add_issues("a.json", vec![ValidationIssue::warning("a.json", Location::root(), "w")]);
        b.add_issues("clean.json", Vec::new());
        let report = b.finish();
        let docs: Vec<&str> = report.documents.iter().map(|d| d.document.as_str()).collect();
        assert_eq!(docs, vec!["z.json", "a.json"]);
        assert_eq!(report.summary.documents, 3);
    }

    #[test]
    fn link_verdicts_and_skip_notes() {
        let mut b = ReportBuilder::new();
        b.add_links(vec![
            link("https://b.example/r.json", LinkStatus::Reachable, Some("3.0.0")),
            link("https://a.example/r.json", LinkStatus::Skipped, Some("2.0")),
            link("https://c.example/r.json", LinkStatus::Skipped, Some("2.0")),
            link("https://d.example/r.json", LinkStatus::Skipped, None),
        ]);
        let report = b.finish();
        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(report.links[0].url.as_str(), "https://a.example/r.json");
        assert_eq!(
            report.skipped,
            vec![
                SkipNote::KnownBroken { count: 1 },
                SkipNote::LegacySchema {
                    version: "2.0".into(),
                    count: 2
                },
            ]
        );

        let mut b = ReportBuilder::new();
        b.add_links(vec![link("https://x.example/r.json", LinkStatus::Indeterminate, None)]);
        assert_eq!(b.finish().verdict, Verdict::Fail);
    }
}
