//! Retry with exponential back-off and jitter for card database requests.
//!
//! Only transient failures are retried against the same endpoint. Anything
//! else is returned straight away so the caller can move on to the next
//! endpoint in the fallback list.

use std::future::Future;
use std::time::Duration;

use crate::error::EnrichError;

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// Retriable: timeouts, connection failures, HTTP 429 and 5xx.
/// Everything else (4xx, malformed bodies, empty catalogs) is final for the
/// endpoint.
pub(crate) fn is_retriable(err: &EnrichError) -> bool {
    match err {
        EnrichError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        EnrichError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        EnrichError::Deserialize { .. }
        | EnrichError::UnexpectedShape { .. }
        | EnrichError::EmptyCatalog { .. }
        | EnrichError::MetadataUnavailable { .. }
        | EnrichError::Cache { .. } => false,
    }
}

/// Upper bound on a single back-off sleep.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Sleep before retry number `retry` (1-based): `base_ms * 2^(retry-1)`,
/// scaled by a random factor in 0.75..=1.25, then capped at [`MAX_DELAY`].
pub(crate) fn backoff_delay(base_ms: u64, retry: u32) -> Duration {
    let exponent = retry.saturating_sub(1).min(10);
    let nominal = base_ms.saturating_mul(1 << exponent);
    let jitter_permille: u64 = rand::random_range(750..=1250);
    let jittered = nominal.saturating_mul(jitter_permille) / 1000;
    Duration::from_millis(jittered).min(MAX_DELAY)
}

/// Runs `operation` once, then up to `max_retries` more times while it keeps
/// failing with a retriable error. Returns the last error otherwise.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, EnrichError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EnrichError>>,
{
    let mut retry = 0u32;
    let mut result = operation().await;
    while let Err(err) = &result {
        if retry == max_retries || !is_retriable(err) {
            break;
        }
        retry += 1;
        let delay = backoff_delay(backoff_base_ms, retry);
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "card database request failed; backing off"
        );
        tokio::time::sleep(delay).await;
        result = operation().await;
    }
    result
}
