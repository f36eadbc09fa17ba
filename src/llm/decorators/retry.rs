//! # Retry decorator
//!
//! Wraps any [`LLM`] so that every `generate` call runs through a
//! [`RetryExecutor`]. Only rate-limited failures (HTTP 429 or
//! `RESOURCE_EXHAUSTED`) are retried; everything else comes back on the first
//! failure, unchanged.
//!
//! ```rust,ignore
//! use spacescope::llm::{RetryConfig, RetryingLLM};
//!
//! let llm = RetryingLLM::new(base_llm, RetryConfig::default());
//! let response = llm.generate(request).await?;
//! ```

use crate::llm::config::RetryConfig;
use crate::llm::core::{LLM, LLMError};
use crate::llm::request::{GenerateRequest, GenerateResponse};
use crate::llm::retry::RetryExecutor;
use async_trait::async_trait;

/// An [`LLM`] that retries rate-limited calls of the wrapped client.
pub struct RetryingLLM<L: LLM> {
    inner: L,
    executor: RetryExecutor,
}

impl<L: LLM> RetryingLLM<L> {
    pub fn new(inner: L, config: RetryConfig) -> Self {
        Self::with_executor(inner, RetryExecutor::new(config))
    }

    pub fn with_executor(inner: L, executor: RetryExecutor) -> Self {
        Self { inner, executor }
    }
}

#[async_trait]
impl<L: LLM> LLM for RetryingLLM<L> {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LLMError> {
        self.executor
            .execute(|| self.inner.generate(request.clone()))
            .await
    }
}

/// A retry decorator for boxed LLM trait objects, used by
/// [`LLMFactory`](crate::llm::LLMFactory).
pub type BoxedRetryLLM = RetryingLLM<Box<dyn LLM>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::core::{ApiFailure, Classify};
    use crate::llm::retry::NoJitter;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockLLM {
        call_count: Arc<AtomicUsize>,
        error_status: Option<u16>,
        fail_first_n: Option<usize>,
    }

    impl MockLLM {
        fn new(call_count: Arc<AtomicUsize>) -> Self {
            Self {
                call_count,
                error_status: None,
                fail_first_n: None,
            }
        }

        fn with_error(mut self, status: u16) -> Self {
            self.error_status = Some(status);
            self
        }

        fn fail_first_n_calls(mut self, n: usize) -> Self {
            self.fail_first_n = Some(n);
            self
        }

        fn failure(status: u16) -> LLMError {
            let code = if status == 429 { "RESOURCE_EXHAUSTED" } else { "INTERNAL" };
            LLMError::Api(ApiFailure::new(
                Some(status),
                Some(code.to_string()),
                "An error occurred.",
            ))
        }
    }

    #[async_trait]
    impl LLM for MockLLM {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, LLMError> {
            let count = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;

            if let Some(fail_count) = self.fail_first_n {
                if count <= fail_count {
                    return Err(Self::failure(429));
                }
                return Ok(GenerateResponse::from_text("Success after retries"));
            }

            match self.error_status {
                Some(status) => Err(Self::failure(status)),
                None => Ok(GenerateResponse::from_text("Success")),
            }
        }
    }

    fn quick() -> RetryExecutor {
        RetryExecutor::with_jitter(
            RetryConfig::new(3, Duration::from_millis(10), Duration::ZERO),
            NoJitter,
        )
    }

    fn request() -> GenerateRequest {
        GenerateRequest::new("gemini-test", "test")
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_on_success() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let llm = RetryingLLM::with_executor(MockLLM::new(call_count.clone()), quick());

        let result = llm.generate(request()).await;

        assert_eq!(result.unwrap().text.as_deref(), Some("Success"));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_on_429_error() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let llm =
            RetryingLLM::with_executor(MockLLM::new(call_count.clone()).with_error(429), quick());

        let result = llm.generate(request()).await;

        assert!(result.unwrap_err().is_rate_limited());
        assert_eq!(call_count.load(Ordering::SeqCst), 4); // 1 initial call + 3 retries
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_on_other_error() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let llm =
            RetryingLLM::with_executor(MockLLM::new(call_count.clone()).with_error(500), quick());

        let result = llm.generate(request()).await;

        assert_eq!(result.unwrap_err(), MockLLM::failure(500));
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_retries() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let llm = RetryingLLM::with_executor(
            MockLLM::new(call_count.clone()).fail_first_n_calls(2),
            quick(),
        );

        let result = llm.generate(request()).await;

        assert_eq!(result.unwrap().text.as_deref(), Some("Success after retries"));
        assert_eq!(call_count.load(Ordering::SeqCst), 3); // 2 failed + 1 success
    }
}
