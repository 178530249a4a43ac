//! Text and JSON rendering of a [`Report`].

use std::fmt::Write as _;

use crate::aggregate::{Report, Verdict};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// One line per finding, then a summary.
    #[default]
    Text,
    /// The whole report as a JSON object.
    Json,
}

impl Report {
    /// Render in `format`.
    pub fn render(&self, format: Format) -> Result<String, serde_json::Error> {
        match format {
            Format::Text => Ok(self.to_text()),
            Format::Json => self.to_json(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// Human-readable report.
    ///
    /// ```text
    /// channel.json /repositories/2 error: repositories must be sorted alphabetically (case-insensitive)
    /// repository.json load error: repository.json: document is empty
    /// unreachable https://example.com/packages.json (timeout)
    /// skipped: repository link check not enabled
    /// FAILED: 1 error, 0 warnings, 1 load failure, 1 of 1 links failed
    /// ```
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for doc in &self.documents {
            for issue in &doc.issues {
                let _ = writeln!(out, "{issue}");
            }
        }
        for failure in &self.load_failures {
            let _ = writeln!(out, "{} load error: {}", failure.document, failure.message);
        }
        for link in &self.links {
            let _ = write!(out, "{} {}", link.status.as_str(), link.url);
            match &link.detail {
                Some(detail) => {
                    let _ = writeln!(out, " ({detail})");
                }
                None => out.push('\n'),
            }
        }
        for note in &self.skipped {
            let _ = writeln!(out, "skipped: {note}");
        }

        let s = &self.summary;
        let head = match self.verdict {
            Verdict::Pass => "PASSED",
            Verdict::Fail => "FAILED",
            Verdict::LoadFailure => "LOAD FAILURE",
        };
        let _ = write!(
            out,
            "{head}: {}, {}, {}",
            plural(s.errors, "error"),
            plural(s.warnings, "warning"),
            plural(s.load_failures, "load failure"),
        );
        if s.links > 0 {
            let _ = write!(out, ", {} of {} links failed", s.failed_links, s.links);
        }
        out.push('\n');
        out
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
