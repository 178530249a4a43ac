//! # chanlint-report: Report Aggregation
//!
//! Merges schema issues, load failures and link check results into one
//! [`Report`] with a pass/fail verdict:
//!
//! | verdict        | exit code | when                                        |
//! |----------------|-----------|---------------------------------------------|
//! | `pass`         | 0         | no error issues, no failed links            |
//! | `fail`         | 1         | an error issue, or an unreachable or indeterminate link |
//! | `load_failure` | 2         | a document could not be loaded (wins over `fail`) |
//!
//! Warnings never fail a run. Rendering is deterministic: the same findings
//! always produce byte-identical output.

pub mod aggregate;
pub mod render;

pub use aggregate::{DocumentIssues, LoadFailure, Report, ReportBuilder, SkipNote, Summary, Verdict};
pub use render::Format;
