//! The generation service: one logical call = fresh client + retry loop.

use crate::llm::config::RetryConfig;
use crate::llm::core::{Classify, FailureKind, LLM, LLMError};
use crate::llm::factory::{ClientFactory, EnvGeminiFactory};
use crate::llm::request::{GenerateRequest, GenerateResponse};
use crate::llm::retry::RetryExecutor;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Issues generative-content requests with rate-limit retries.
///
/// Every call obtains its own client from the [`ClientFactory`] and keeps its
/// own retry bookkeeping, so the service can be cloned and shared freely.
#[derive(Clone)]
pub struct GenerationService {
    factory: Arc<dyn ClientFactory>,
    executor: RetryExecutor,
}

impl GenerationService {
    pub fn new(factory: impl ClientFactory + 'static, config: RetryConfig) -> Self {
        Self::with_executor(factory, RetryExecutor::new(config))
    }

    pub fn with_executor(factory: impl ClientFactory + 'static, executor: RetryExecutor) -> Self {
        Self {
            factory: Arc::new(factory),
            executor,
        }
    }

    /// A service backed by Gemini, configured from the environment on each
    /// call, with the default retry policy.
    pub fn from_env() -> Self {
        Self::new(EnvGeminiFactory, RetryConfig::default())
    }

    pub fn retry_config(&self) -> &RetryConfig {
        self.executor.config()
    }

    /// Run one logical request.
    ///
    /// A missing credential fails here, before anything is sent. Rate-limited
    /// attempts are retried per the policy; the error that ends the call is
    /// returned exactly as the client produced it.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LLMError> {
        let client = self.factory.create()?;
        debug!(model = %request.model, "Starting logical generation call");
        self.executor
            .execute(|| client.generate(request.clone()))
            .await
            .inspect_err(log_failure)
    }

    /// Like [`generate`](Self::generate), but stops with
    /// [`LLMError::Cancelled`] if `cancel` fires while backing off.
    pub async fn generate_cancellable(
        &self,
        request: GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, LLMError> {
        let client = self.factory.create()?;
        debug!(model = %request.model, "Starting cancellable generation call");
        self.executor
            .execute_cancellable(cancel, || client.generate(request.clone()))
            .await
            .inspect_err(log_failure)
    }
}

/// Exhausted rate limits are already reported by the executor.
fn log_failure(error: &LLMError) {
    match error.failure_kind() {
        FailureKind::RateLimited | FailureKind::Cancelled => {}
        FailureKind::Configuration | FailureKind::Terminal => {
            error!(error = %error, "Critical transmission error");
        }
    }
}
