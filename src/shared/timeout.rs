//! Bounded external calls
//!
//! Vendor and roaming collaborators are awaited under a deadline. An elapsed
//! deadline surfaces as [`DomainError::Timeout`]; calls are never retried here.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::errors::{DomainError, DomainResult};

pub async fn with_timeout<T, F>(operation: &str, secs: u64, call: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    match tokio::time::timeout(Duration::from_secs(secs), call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, secs, "External call timed out");
            Err(DomainError::Timeout {
                operation: operation.to_string(),
                secs,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_result() {
        let result = with_timeout("noop", 1, async { Ok::<_, DomainError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_is_timeout() {
        let result = with_timeout("slow", 2, async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, DomainError>(())
        })
        .await;
        match result {
            Err(DomainError::Timeout { operation, secs }) => {
                assert_eq!(operation, "slow");
                assert_eq!(secs, 2);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
