//! Bounded retry of store operations on transient failures.

use std::future::Future;
use std::time::Duration;

use domain::StoreError;
use tracing::warn;

use crate::error::map_sqlx_error;
use crate::metrics::record_retry;

/// Base delay between attempts; attempt `n` waits `n * RETRY_BACKOFF`.
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Runs `op` and retries it up to `max_retries` times while it fails with a
/// transient error. Each attempt must be self-contained (its own transaction).
pub async fn with_retry<T, F, Fut>(
    operation: &'static str,
    max_retries: u32,
    mut op: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 0;
    loop {
        match op().await.map_err(map_sqlx_error) {
            Err(err) if err.is_transient() && attempt < max_retries => {
                attempt += 1;
                warn!(
                    operation = operation,
                    attempt = attempt,
                    error = %err,
                    "Transient store error, retrying"
                );
                record_retry(operation);
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            result => return result,
        }
    }
}
