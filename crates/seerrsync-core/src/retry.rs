//! Bounded retry with doubling backoff for remote calls.
//!
//! Every network call in the pipeline goes through one [`RetryPolicy`]:
//! transient failures (connect/timeout, HTTP 5xx) retry up to the
//! bound, authentication and parse failures fail immediately. Callers
//! that need to classify the final error themselves (the applicator's
//! committed-change accounting, the pruner's per-link bookkeeping) use
//! [`RetryPolicy::run`]; everything else uses [`RetryPolicy::call`].

use std::time::Duration;

use tracing::warn;

use seerrsync_api::ApiError;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt, transient failures only.
    pub retries: u32,
    /// Initial delay; doubles per attempt.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Final failure of a retried call.
#[derive(Debug)]
pub struct RetryFailure {
    /// Attempts made, including the failing one.
    pub attempts: u32,
    pub source: ApiError,
}

impl RetryFailure {
    /// Classify into the pipeline error taxonomy.
    pub fn into_core(self) -> CoreError {
        if self.source.is_auth() {
            CoreError::Auth
        } else if self.source.is_transient() {
            CoreError::Connection {
                attempts: self.attempts,
                source: self.source,
            }
        } else {
            CoreError::from_api(self.source)
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails non-transiently, or exhausts
    /// the retry bound. The final error keeps the attempt count.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, RetryFailure>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ApiError>>,
    {
        let mut delay = self.backoff;
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt <= self.retries => {
                    warn!(attempt, error = %err, "transient failure, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(err) => {
                    return Err(RetryFailure {
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }

    /// [`run`](Self::run) plus taxonomy classification.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<T, CoreError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ApiError>>,
    {
        self.run(op).await.map_err(RetryFailure::into_core)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn policy(retries: u32) -> RetryPolicy {
        RetryPolicy {
            retries,
            backoff: Duration::ZERO,
        }
    }

    fn transient() -> ApiError {
        ApiError::Api {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[tokio::test]
    async fn transient_failures_retry_until_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, _> = policy(3)
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n < 2 { Err(transient()) } else { Ok(n) } }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_keep_the_attempt_count() {
        let calls = AtomicU32::new(0);
        let failure = policy(2)
            .run::<u32, _, _>(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient()) }
            })
            .await
            .unwrap_err();

        assert_eq!(failure.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            failure.into_core(),
            CoreError::Connection { attempts: 3, .. }
        ));
    }

    #[tokio::test]
    async fn auth_failures_never_retry() {
        let calls = AtomicU32::new(0);
        let failure = policy(5)
            .run::<u32, _, _>(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ApiError::InvalidApiKey) }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(failure.into_core(), CoreError::Auth));
    }

    #[tokio::test]
    async fn non_transient_failures_never_retry() {
        let calls = AtomicU32::new(0);
        let failure = policy(5)
            .run::<u32, _, _>(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ApiError::Api {
                        status: 400,
                        message: "bad request".into(),
                    })
                }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(failure.into_core(), CoreError::Api { .. }));
    }
}
