//! # Rate-limit retry executor
//!
//! Runs one logical request as a sequence of attempts. Attempts that fail
//! with a rate-limited error are retried after an exponentially growing,
//! jittered wait; every other failure is returned as-is.
//!
//! | Condition                                 | Action                     |
//! |-------------------------------------------|----------------------------|
//! | `op` succeeds                             | return value, stop         |
//! | `op` fails, terminal error                | return error, stop         |
//! | `op` fails, rate-limited, retries left    | sleep(backoff + jitter)    |
//! | `op` fails, rate-limited, no retries left | return error, stop         |
//!
//! ```rust,ignore
//! use spacescope::llm::{RetryConfig, RetryExecutor};
//!
//! let executor = RetryExecutor::new(RetryConfig::default());
//! let response = executor.execute(|| client.generate(request.clone())).await?;
//! ```

use crate::llm::config::{BACKOFF_MULTIPLIER, RetryConfig, saturating_millis};
use crate::llm::core::{Cancelled, Classify, FailureKind};
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Source of the random component added to each backoff.
pub trait Jitter: Send + Sync {
    /// A delay drawn from `[0, max)`. Must return zero when `max` is zero.
    fn sample(&self, max: Duration) -> Duration;
}

/// Uniform jitter from the thread-local RNG, at full `Duration` resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn sample(&self, max: Duration) -> Duration {
        if max.is_zero() {
            return Duration::ZERO;
        }
        rand::rng().random_range(Duration::ZERO..max)
    }
}

/// No jitter at all; waits are exactly the backoff.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn sample(&self, _max: Duration) -> Duration {
        Duration::ZERO
    }
}

/// Per-call bookkeeping. Created at the start of a logical call and dropped
/// at its end; never shared between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    pub attempts_remaining: u32,
    pub current_backoff: Duration,
}

impl AttemptState {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            attempts_remaining: config.max_retries,
            current_backoff: config.initial_backoff,
        }
    }

    /// Consume one retry. Returns the backoff to wait before it, or `None`
    /// when the budget is exhausted.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempts_remaining == 0 {
            return None;
        }
        let backoff = self.current_backoff;
        self.attempts_remaining -= 1;
        self.current_backoff = self.current_backoff.saturating_mul(BACKOFF_MULTIPLIER);
        Some(backoff)
    }
}

/// Why the attempt loop stopped without a value.
enum Stop<E> {
    Failed(E),
    Cancelled,
}

/// Retries rate-limited operations with exponential backoff and jitter.
///
/// The executor holds only its immutable configuration, so a single instance
/// can drive any number of concurrent logical calls; each call keeps its own
/// [`AttemptState`].
#[derive(Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    jitter: Arc<dyn Jitter>,
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self::with_jitter(config, RandomJitter)
    }

    pub fn with_jitter(config: RetryConfig, jitter: impl Jitter + 'static) -> Self {
        Self {
            config,
            jitter: Arc::new(jitter),
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `op` until it succeeds, fails terminally, or runs out of retries.
    ///
    /// `op` is invoked at most `max_retries + 1` times. The error returned is
    /// the one produced by the last invocation, untouched.
    pub async fn execute<T, E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        match self.run(op, None).await {
            Ok(value) => Ok(value),
            Err(Stop::Failed(e)) => Err(e),
            Err(Stop::Cancelled) => unreachable!("no cancellation token was supplied"),
        }
    }

    /// Like [`execute`](Self::execute), but a fired `cancel` token ends the
    /// call during a backoff wait with `E::from(Cancelled)`. The first attempt
    /// always runs.
    pub async fn execute_cancellable<T, E, F, Fut>(
        &self,
        cancel: &CancellationToken,
        op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display + From<Cancelled>,
    {
        match self.run(op, Some(cancel)).await {
            Ok(value) => Ok(value),
            Err(Stop::Failed(e)) => Err(e),
            Err(Stop::Cancelled) => Err(E::from(Cancelled)),
        }
    }

    /// Backoff plus jitter. Saturates at `Duration::MAX`.
    fn wait_for(&self, backoff: Duration) -> Duration {
        backoff.saturating_add(self.jitter.sample(self.config.jitter_max))
    }

    async fn run<T, E, F, Fut>(
        &self,
        mut op: F,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, Stop<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        let mut state = AttemptState::new(&self.config);
        let mut attempt: u32 = 1;

        loop {
            debug!(attempt, "Dispatching request");
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let kind = error.failure_kind();
            if kind != FailureKind::RateLimited {
                debug!(attempt, ?kind, error = %error, "Request failed, not retrying");
                return Err(Stop::Failed(error));
            }

            let Some(backoff) = state.next_backoff() else {
                error!(
                    attempts = attempt,
                    error = %error,
                    "Rate limit persisted after all retries"
                );
                return Err(Stop::Failed(error));
            };

            let wait = self.wait_for(backoff);
            warn!(
                wait_ms = saturating_millis(wait),
                attempts_remaining = state.attempts_remaining,
                "Signal congestion detected (429/quota), backing off"
            );

            match cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            debug!(attempt, "Cancelled during backoff");
                            return Err(Stop::Cancelled);
                        }
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
                None => tokio::time::sleep(wait).await,
            }
            attempt += 1;
        }
    }
}
