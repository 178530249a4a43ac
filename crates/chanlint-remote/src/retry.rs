//! Single-retry policy for repository fetches.
//!
//! A fetch is retried once, and only on a transient transport error
//! (connect failure, reset, timeout). Status codes and unparseable bodies
//! fail immediately.

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::error::FetchError;

/// Retries after the initial attempt.
pub(crate) const MAX_RETRIES: u32 = 1;

/// Pause before the retry.
const RETRY_DELAY: Duration = Duration::from_millis(200);

pub(crate) async fn retry_once<T, F, Fut>(url: &Url, f: F) -> Result<T, FetchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    match f().await {
        Err(e) if e.is_transient() => {
            tracing::warn!(
                url = %url,
                attempt = 1,
                max_retries = MAX_RETRIES,
                "fetch failed, retrying in {RETRY_DELAY:?}: {e}"
            );
            tokio::time::sleep(RETRY_DELAY).await;
            f().await
        }
        other => other,
    }
}
