//! Bounded timeouts and retry for storage-facing operations.

use std::future::Future;
use std::time::Duration;

use hive_core::{CoreError, CoreResult};

pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_millis(50);

/// Run `fut` under a deadline, mapping expiry to `CoreError::Timeout`.
pub async fn bounded<T, F>(op: &str, limit: Duration, fut: F) -> CoreResult<T>
where
    F: Future<Output = CoreResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(op, limit_ms = limit.as_millis() as u64, "operation timed out");
            Err(CoreError::Timeout(format!("{op} exceeded {limit:?}")))
        }
    }
}

/// Retry transient `Unavailable` failures with exponential backoff.
/// Conflicts and validation errors are never retried; the caller must
/// re-fetch and decide.
pub async fn with_retry<T, F, Fut>(op: &str, mut f: F) -> CoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CoreResult<T>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Err(CoreError::Unavailable(reason)) if attempt + 1 < MAX_ATTEMPTS => {
                attempt += 1;
                let backoff = BACKOFF_BASE * 2u32.pow(attempt - 1);
                tracing::warn!(op, attempt, reason, "storage unavailable, retrying");
                tokio::time::sleep(backoff).await;
            }
            other => return other,
        }
    }
}
