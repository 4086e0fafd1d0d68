//! Connection guard: a bounded startup probe for the reflection store.
//!
//! Runs once before the gateway accepts traffic:
//!
//! ```text
//! Attempting(n) --ok--------------------------> Ready
//! Attempting(n) --Connection, n < max--sleep--> Attempting(n + 1)
//! Attempting(n) --Connection, n == max--------> Failed (RetriesExhausted)
//! Attempting(n) --any other error-------------> returned as-is, no retry
//! ```
//!
//! Backoff is linear: the same `delay` between every attempt.

use async_trait::async_trait;
use careerlens_core::error::StoreError;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// Waits between attempts. Injected so tests never sleep for real.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Where the guard is in its probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// About to make attempt `n` (1-based).
    Attempting(u32),
    Ready,
    Failed,
}

impl GuardState {
    /// Transition after a retryable connection failure.
    pub fn after_connection_failure(self, max_attempts: u32) -> GuardState {
        match self {
            GuardState::Attempting(n) if n < max_attempts => GuardState::Attempting(n + 1),
            GuardState::Attempting(_) => GuardState::Failed,
            terminal => terminal,
        }
    }
}

/// Establishes the store connection with bounded retry.
pub struct ConnectionGuard<S: Sleeper = TokioSleeper> {
    max_attempts: u32,
    delay: Duration,
    sleeper: S,
}

impl ConnectionGuard<TokioSleeper> {
    /// `max_attempts` of 0 is treated as 1: at least one attempt is made.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            sleeper: TokioSleeper,
        }
    }
}

impl Default for ConnectionGuard<TokioSleeper> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl<S: Sleeper> ConnectionGuard<S> {
    /// Replace the sleeper (tests use one that records instead of waiting).
    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> ConnectionGuard<T> {
        ConnectionGuard {
            max_attempts: self.max_attempts,
            delay: self.delay,
            sleeper,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Drive `connect` until it succeeds, fails fatally, or attempts run out.
    ///
    /// `connect` receives the 1-based attempt number. Only
    /// [`StoreError::Connection`] is retried.
    pub async fn ensure_ready<T, F, Fut>(&self, mut connect: F) -> Result<T, StoreError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut state = GuardState::Attempting(1);

        while let GuardState::Attempting(attempt) = state {
            match connect(attempt).await {
                Ok(ready) => {
                    info!(attempt, "Store connection ready");
                    return Ok(ready);
                }
                Err(StoreError::Connection(reason)) => {
                    state = state.after_connection_failure(self.max_attempts);
                    if state == GuardState::Failed {
                        error!(
                            attempts = attempt,
                            error = %reason,
                            "Store connection failed, giving up"
                        );
                        return Err(StoreError::RetriesExhausted {
                            attempts: attempt,
                            last_error: reason,
                        });
                    }
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_secs = self.delay.as_secs_f64(),
                        error = %reason,
                        "Store connection failed, retrying"
                    );
                    self.sleeper.sleep(self.delay).await;
                }
                Err(other) => {
                    error!(attempt, error = %other, "Store setup failed with a non-retryable error");
                    return Err(other);
                }
            }
        }

        // Only reachable if the loop is entered in a terminal state.
        Err(StoreError::RetriesExhausted {
            attempts: 0,
            last_error: "connection guard did not run".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSleeper {
        slept: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        fn naps(&self) -> Vec<Duration> {
            self.slept.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    fn refused() -> StoreError {
        StoreError::Connection("connection refused".into())
    }

    #[tokio::test]
    async fn succeeds_after_two_failures() {
        let sleeper = RecordingSleeper::default();
        let guard = ConnectionGuard::new(3, Duration::ZERO).with_sleeper(sleeper.clone());
        let mut script = vec![Err(refused()), Err(refused()), Ok("pool")].into_iter();
        let mut attempts = Vec::new();

        let ready = guard
            .ensure_ready(|n| {
                attempts.push(n);
                let outcome = script.next().unwrap();
                async move { outcome }
            })
            .await
            .unwrap();

        assert_eq!(ready, "pool");
        assert_eq!(attempts, vec![1, 2, 3]);
        assert_eq!(sleeper.naps().len(), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let sleeper = RecordingSleeper::default();
        let guard = ConnectionGuard::new(3, Duration::ZERO).with_sleeper(sleeper.clone());
        let mut attempts = 0u32;

        let err = guard
            .ensure_ready(|_| {
                attempts += 1;
                async { Err::<(), _>(refused()) }
            })
            .await
            .unwrap_err();

        assert_eq!(attempts, 3);
        match err {
            StoreError::RetriesExhausted { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("refused"));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        // No sleep after the final attempt.
        assert_eq!(sleeper.naps().len(), 2);
    }

    #[tokio::test]
    async fn non_connection_error_is_not_retried() {
        let sleeper = RecordingSleeper::default();
        let guard = ConnectionGuard::new(5, Duration::ZERO).with_sleeper(sleeper.clone());
        let mut attempts = 0u32;

        let err = guard
            .ensure_ready(|_| {
                attempts += 1;
                async { Err::<(), _>(StoreError::Migration("syntax error".into())) }
            })
            .await
            .unwrap_err();

        assert_eq!(attempts, 1);
        assert!(matches!(err, StoreError::Migration(_)));
        assert!(sleeper.naps().is_empty());
    }

    #[tokio::test]
    async fn backoff_is_linear() {
        let sleeper = RecordingSleeper::default();
        let delay = Duration::from_secs(5);
        let guard = ConnectionGuard::new(4, delay).with_sleeper(sleeper.clone());

        let _ = guard
            .ensure_ready(|_| async { Err::<(), _>(refused()) })
            .await;

        assert_eq!(sleeper.naps(), vec![delay, delay, delay]);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let guard = ConnectionGuard::new(0, Duration::ZERO).with_sleeper(RecordingSleeper::default());
        let mut attempts = 0u32;
        let _ = guard
            .ensure_ready(|_| {
                attempts += 1;
                async { Err::<(), _>(refused()) }
            })
            .await;
        assert_eq!(attempts, 1);
    }

    #[test]
    fn defaults_match_startup_policy() {
        let guard = ConnectionGuard::default();
        assert_eq!(guard.max_attempts(), 5);
        assert_eq!(guard.delay, Duration::from_secs(5));
    }

    #[test]
    fn state_transitions() {
        assert_eq!(
            GuardState::Attempting(1).after_connection_failure(3),
            GuardState::Attempting(2)
        );
        assert_eq!(
            GuardState::Attempting(3).after_connection_failure(3),
            GuardState::Failed
        );
        assert_eq!(GuardState::Ready.after_connection_failure(3), GuardState::Ready);
    }
}
