//! # chanlint-remote: Repository Link Checking
//!
//! Fetches the third-party repositories referenced from a channel and
//! reports, per URL, whether a usable repository document is served there.
//!
//! - [`fetch`]: `reqwest` client with per-request timeout and a
//!   configurable `User-Agent`.
//! - `retry`: one retry on transient transport failures.
//! - [`links`]: the worker-pool link checker.
//!
//! Nothing here is fatal to a run: every failure becomes a
//! [`LinkCheckResult`].

pub mod error;
pub mod fetch;
pub mod links;
pub(crate) mod retry;

pub use error::FetchError;
pub use fetch::{FetchConfig, Fetcher};
pub use links::{remote_references, LinkCheckResult, LinkChecker, LinkOutcome, LinkStatus};
