//! # Repository Link Checker
//!
//! Verifies that every remote repository referenced from the channel is
//! reachable and serves a parseable repository document.
//!
//! ## Execution model
//!
//! A fixed pool of tokio worker tasks pulls URLs from a shared job channel
//! (the receiver sits behind a mutex) and sends fetch results back on a
//! result channel. The coordinating task owns the set of seen URLs: when a
//! fetched repository lists `includes`, they are resolved against its URL
//! and queued as the next wave, unless already seen.
//!
//! Cancellation (a `watch` signal or the optional deadline) stops the
//! coordinator, aborts the workers and reports every URL still in flight or
//! queued as [`LinkStatus::Indeterminate`].

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chanlint_core::{LinkCheckConfig, LoadedDocument, SCHEMA_VERSION};
use serde::Serialize;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinSet;
use url::Url;

use crate::error::FetchError;
use crate::fetch::{FetchConfig, Fetcher};

/// Schema versions of repositories that predate the current format. They
/// are still served by some hosts and are skipped rather than failed.
pub const LEGACY_SCHEMA_VERSIONS: &[f64] = &[1.0, 1.1, 1.2, 2.0];

/// Outcome class of one link check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    /// Fetched and parsed as a current repository document.
    Reachable,
    /// Fetch failed, or the document is unusable.
    Unreachable,
    /// No answer before the run was cancelled.
    Indeterminate,
    /// Not checked: known-broken URL or legacy schema.
    Skipped,
}

impl LinkStatus {
    /// Lowercase label used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reachable => "reachable",
            Self::Unreachable => "unreachable",
            Self::Indeterminate => "indeterminate",
            Self::Skipped => "skipped",
        }
    }

    /// True if this result fails the run.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Unreachable | Self::Indeterminate)
    }
}

/// Result of checking one repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCheckResult {
    /// Checked URL.
    pub url: Url,
    /// Outcome class.
    pub status: LinkStatus,
    /// Why the URL is not reachable, or why it was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// `schema_version` declared by the fetched document, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
}

impl LinkCheckResult {
    fn new(url: Url, status: LinkStatus, detail: Option<String>) -> Self {
        Self {
            url,
            status,
            detail,
            schema_version: None,
        }
    }

    /// Shorthand for `self.status == LinkStatus::Reachable`.
    pub fn reachable(&self) -> bool {
        self.status == LinkStatus::Reachable
    }
}

/// A link result plus the fetched document when it is reachable, so the
/// caller can run schema validation over it.
#[derive(Debug, Clone)]
pub struct LinkOutcome {
    /// The link check result.
    pub result: LinkCheckResult,
    /// The parsed document of a reachable repository.
    pub document: Option<LoadedDocument>,
}

/// Absolute HTTP(S) repository references of a channel. Relative (`./`)
/// entries are local files and are not fetched.
pub fn remote_references(channel: &LoadedDocument) -> Vec<Url> {
    let mut seen = HashSet::new();
    channel
        .repository_references()
        .into_iter()
        .filter_map(|reference| Url::parse(reference).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Fetches repository URLs with a bounded worker pool.
#[derive(Debug)]
pub struct LinkChecker {
    config: LinkCheckConfig,
    fetcher: Arc<Fetcher>,
}

type Fetched = (Url, Result<LoadedDocument, FetchError>);

struct Crawl {
    seen: HashSet<Url>,
    pending: BTreeSet<Url>,
    outcomes: Vec<LinkOutcome>,
    jobs: mpsc::UnboundedSender<Url>,
}

impl LinkChecker {
    /// Build a checker and its HTTP client.
    pub fn new(config: LinkCheckConfig) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(&FetchConfig::from(&config))?;
        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
        })
    }

    /// Check `roots` and, transitively, the includes of every reachable
    /// repository. Outcomes are sorted by URL.
    ///
    /// `cancel` flipping to `true` stops the check early.
    pub async fn check(&self, roots: Vec<Url>, cancel: watch::Receiver<bool>) -> Vec<LinkOutcome> {
        let (job_tx, job_rx) = mpsc::unbounded_channel::<Url>();
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<Fetched>();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let pool_size = self.config.concurrency.max(1);
        let mut workers = JoinSet::new();
        for id in 0..pool_size {
            workers.spawn(worker(
                id,
                Arc::clone(&self.fetcher),
                Arc::clone(&job_rx),
                result_tx.clone(),
            ));
        }
        drop(result_tx);

        let mut crawl = Crawl {
            seen: HashSet::new(),
            pending: BTreeSet::new(),
            outcomes: Vec::new(),
            jobs: job_tx,
        };
        for url in roots {
            self.enqueue(&mut crawl, url);
        }
        tracing::info!(
            queued = crawl.pending.len(),
            workers = pool_size,
            "checking repository links"
        );

        let stop = stop_signal(cancel, self.config.deadline);
        tokio::pin!(stop);

        let mut stopped: Option<&'static str> = None;
        while !crawl.pending.is_empty() {
            tokio::select! {
                received = result_rx.recv() => {
                    let Some((url, fetched)) = received else {
                        stopped = Some("worker pool exited");
                        break;
                    };
                    crawl.pending.remove(&url);
                    let (outcome, includes) = classify(url, fetched);
                    crawl.outcomes.push(outcome);
                    for include in includes {
                        self.enqueue(&mut crawl, include);
                    }
                }
                reason = &mut stop => {
                    stopped = Some(reason);
                    break;
                }
            }
        }

        workers.abort_all();
        if let Some(reason) = stopped {
            tracing::warn!(
                unfinished = crawl.pending.len(),
                reason,
                "link check stopped early"
            );
            for url in std::mem::take(&mut crawl.pending) {
                crawl.outcomes.push(LinkOutcome {
                    result: LinkCheckResult::new(url, LinkStatus::Indeterminate, Some(reason.to_string())),
                    document: None,
                });
            }
        }

        crawl.outcomes.sort_by(|a, b| a.result.url.cmp(&b.result.url));
        crawl.outcomes
    }

    fn enqueue(&self, crawl: &mut Crawl, url: Url) {
        if !crawl.seen.insert(url.clone()) {
            return;
        }
        if self.config.is_skipped(&url) {
            tracing::info!(url = %url, "skipping known broken repository");
            crawl.outcomes.push(LinkOutcome {
                result: LinkCheckResult::new(
                    url,
                    LinkStatus::Skipped,
                    Some("known broken repository".to_string()),
                ),
                document: None,
            });
            return;
        }
        match crawl.jobs.send(url.clone()) {
            Ok(()) => {
                crawl.pending.insert(url);
            }
            Err(_) => crawl.outcomes.push(LinkOutcome {
                result: LinkCheckResult::new(
                    url,
                    LinkStatus::Indeterminate,
                    Some("worker pool exited".to_string()),
                ),
                document: None,
            }),
        }
    }
}

async fn worker(
    id: usize,
    fetcher: Arc<Fetcher>,
    jobs: Arc<Mutex<mpsc::UnboundedReceiver<Url>>>,
    results: mpsc::UnboundedSender<Fetched>,
) {
    loop {
        let next = { jobs.lock().await.recv().await };
        let Some(url) = next else {
            break;
        };
        tracing::debug!(worker = id, url = %url, "job started");
        let fetched = fetcher.fetch(&url).await;
        if results.send((url, fetched)).is_err() {
            break;
        }
    }
}

/// Resolves when `cancel` becomes `true` or the deadline passes, with the
/// reason. A dropped cancel sender means cancellation can no longer happen.
async fn stop_signal(
    mut cancel: watch::Receiver<bool>,
    deadline: Option<std::time::Duration>,
) -> &'static str {
    let cancelled = async move {
        loop {
            if *cancel.borrow_and_update() {
                return;
            }
            if cancel.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    };
    let expired = async move {
        match deadline {
            Some(budget) => tokio::time::sleep(budget).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        () = cancelled => "cancelled",
        () = expired => "deadline exceeded",
    }
}

/// Turn a fetch result into a link outcome and the includes to queue next.
fn classify(url: Url, fetched: Result<LoadedDocument, FetchError>) -> (LinkOutcome, Vec<Url>) {
    let doc = match fetched {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "repository unreachable");
            let result = LinkCheckResult::new(url, LinkStatus::Unreachable, Some(e.detail()));
            return (LinkOutcome { result, document: None }, Vec::new());
        }
    };

    let version = doc.schema_version();
    let (status, detail) = match version.as_deref() {
        None => (
            LinkStatus::Unreachable,
            Some("missing schema_version".to_string()),
        ),
        Some(SCHEMA_VERSION) => (LinkStatus::Reachable, None),
        Some(v) if is_legacy(v) => (LinkStatus::Skipped, Some(format!("legacy schema version {v}"))),
        Some(v) => (
            LinkStatus::Unreachable,
            Some(format!("unrecognized schema version {v}")),
        ),
    };
    tracing::info!(url = %url, status = status.as_str(), "checked repository");

    let mut result = LinkCheckResult::new(url, status, detail);
    result.schema_version = version;
    if status != LinkStatus::Reachable {
        return (LinkOutcome { result, document: None }, Vec::new());
    }

    let mut includes = Vec::new();
    for reference in doc.includes() {
        match doc.source.resolve(reference) {
            Ok(chanlint_core::DocumentSource::Url(include)) => includes.push(include),
            Ok(_) => {}
            Err(e) => tracing::warn!(url = %result.url, error = %e, "skipping include"),
        }
    }
    (
        LinkOutcome {
            result,
            document: Some(doc),
        },
        includes,
    )
}

fn is_legacy(version: &str) -> bool {
    version
        .parse::<f64>()
        .is_ok_and(|v| LEGACY_SCHEMA_VERSIONS.iter().any(|l| (l - v).abs() < f64::EPSILON))
}
