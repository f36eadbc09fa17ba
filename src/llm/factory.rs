use crate::llm::config::{RetryConfig, saturating_millis};
use crate::llm::core::{LLM, LLMError};
use crate::llm::decorators::BoxedRetryLLM;
use crate::llm::gemini::GeminiClient;
use crate::llm::settings::GeminiSettings;

/// Source of client handles for the generative-content service.
///
/// [`GenerationService`](crate::llm::GenerationService) asks for a fresh
/// handle at the start of every logical call. Returning an error here is a
/// configuration failure: it is reported before any request is sent and is
/// never retried.
///
/// Any `Fn() -> Result<Box<dyn LLM>, LLMError>` closure is a factory, which
/// keeps fakes in tests to a one-liner.
pub trait ClientFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn LLM>, LLMError>;
}

impl<F> ClientFactory for F
where
    F: Fn() -> Result<Box<dyn LLM>, LLMError> + Send + Sync,
{
    fn create(&self) -> Result<Box<dyn LLM>, LLMError> {
        self()
    }
}

/// Builds a [`GeminiClient`] from the process environment on every call, so
/// a rotated key is picked up without restarting.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvGeminiFactory;

impl ClientFactory for EnvGeminiFactory {
    fn create(&self) -> Result<Box<dyn LLM>, LLMError> {
        let settings = GeminiSettings::from_env()?;
        Ok(Box::new(GeminiClient::new(settings)?))
    }
}

/// Builds a [`GeminiClient`] from fixed settings.
#[derive(Debug, Clone)]
pub struct StaticGeminiFactory {
    settings: GeminiSettings,
}

impl StaticGeminiFactory {
    pub fn new(settings: GeminiSettings) -> Self {
        Self { settings }
    }
}

impl ClientFactory for StaticGeminiFactory {
    fn create(&self) -> Result<Box<dyn LLM>, LLMError> {
        Ok(Box::new(GeminiClient::new(self.settings.clone())?))
    }
}

/// Factory for wrapping LLM instances with optional decorators.
///
/// Use this when a long-lived client should retry on its own; the
/// [`GenerationService`](crate::llm::GenerationService) covers the
/// fresh-client-per-call flow.
pub struct LLMFactory;

impl LLMFactory {
    /// Wrap `base_llm` with retry when `retry_config` allows at least one
    /// retry; return it untouched otherwise.
    pub fn create(base_llm: Box<dyn LLM>, retry_config: Option<RetryConfig>) -> Box<dyn LLM> {
        match retry_config {
            Some(config) if config.max_retries > 0 => {
                tracing::debug!(
                    max_retries = config.max_retries,
                    initial_backoff_ms = saturating_millis(config.initial_backoff),
                    jitter_max_ms = saturating_millis(config.jitter_max),
                    "Wrapping LLM with retry decorator"
                );
                Box::new(BoxedRetryLLM::new(base_llm, config))
            }
            Some(_) => {
                tracing::debug!("Retry config allows no retries, using base LLM");
                base_llm
            }
            None => {
                tracing::debug!("No retry config provided, using base LLM");
                base_llm
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::core::{ApiFailure, Classify};
    use crate::llm::request::{GenerateRequest, GenerateResponse};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingLLM {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LLM for CountingLLM {
        async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LLMError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.prompt_text() == "throttle" {
                return Err(LLMError::Api(ApiFailure::new(Some(429), None, "slow down")));
            }
            Ok(GenerateResponse::from_text(format!("base: {}", request.prompt_text())))
        }
    }

    fn counting(calls: &Arc<AtomicUsize>) -> Box<dyn LLM> {
        Box::new(CountingLLM {
            calls: calls.clone(),
        })
    }

    #[tokio::test]
    async fn test_create_without_retry_config() {
        let calls = Arc::new(AtomicUsize::new(0));
        let llm = LLMFactory::create(counting(&calls), None);

        let result = llm.generate(GenerateRequest::new("m", "throttle")).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_with_retry_config() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = RetryConfig::new(2, Duration::from_millis(10), Duration::from_millis(1));
        let llm = LLMFactory::create(counting(&calls), Some(config));

        let ok = llm.generate(GenerateRequest::new("m", "test")).await.unwrap();
        assert_eq!(ok.text.as_deref(), Some("base: test"));

        let err = llm.generate(GenerateRequest::new("m", "throttle")).await;
        assert!(err.unwrap_err().is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 1 + 3);
    }

    #[tokio::test]
    async fn test_create_with_disabled_retry() {
        let calls = Arc::new(AtomicUsize::new(0));
        let llm = LLMFactory::create(counting(&calls), Some(RetryConfig::disabled()));

        let result = llm.generate(GenerateRequest::new("m", "throttle")).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closure_factory() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory = {
            let calls = calls.clone();
            move || -> Result<Box<dyn LLM>, LLMError> { Ok(counting(&calls)) }
        };

        let llm = factory.create().unwrap();
        let response = llm.generate(GenerateRequest::new("m", "hi")).await.unwrap();
        assert_eq!(response.text.as_deref(), Some("base: hi"));
    }
}
