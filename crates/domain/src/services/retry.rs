//! Bounded retry for idempotent reads.

use std::future::Future;
use std::time::Duration;

/// Delay before the single retry of a failed read.
pub const DEFAULT_READ_RETRY_DELAY: Duration = Duration::from_millis(150);

/// Runs `op`, and once more after `delay` if the first attempt fails.
///
/// Only for idempotent reads. Writes are single-attempt.
pub async fn retry_read<T, E, F, Fut>(delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::debug!(error = %e, delay_ms = delay.as_millis() as u64, "Read failed, retrying once");
            tokio::time::sleep(delay).await;
            op().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_read_succeeds_on_second_attempt() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let result: Result<&str, String> = retry_read(Duration::from_millis(1), || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("transient".to_string())
            } else {
                Ok("site")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "site");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_read_gives_up_after_one_retry() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let result: Result<(), String> = retry_read(Duration::from_millis(1), || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err("down".to_string())
        })
        .await;

        assert_eq!(result.unwrap_err(), "down");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_read_no_retry_on_success() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let result: Result<u8, String> = retry_read(Duration::from_millis(1), || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
