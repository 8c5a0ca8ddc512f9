//! Retry with exponential backoff for transient geocoder failures.
//!
//! Only rate limiting and network-level errors are retried; API rejections
//! and no-match results are propagated immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::GeocodeError;

fn is_retriable(err: &GeocodeError) -> bool {
    matches!(
        err,
        GeocodeError::RateLimited { .. } | GeocodeError::Http(_)
    )
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional attempts with a delay of `backoff_base_secs * 2^attempt`
/// before each retry. The last error is returned when retries run out.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, GeocodeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GeocodeError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_secs,
                    error = %err,
                    "transient geocoder error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                attempt += 1;
            }
        }
    }
}
