//! # Retry
//!
//! Re-run an upstream request while it fails transiently and attempts
//! remain. Cancellation is the caller's job: wrap the call in a `select!`
//! against the shutdown listener.

use std::future::Future;

use mr_03_bundle_source::SourceError;
use tracing::warn;

use crate::config::RetryPolicy;

/// Run `op`, retrying transient failures according to `policy`.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &'static str,
    mut op: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                attempt += 1;
                let delay = policy.backoff(attempt);
                warn!(
                    what,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
