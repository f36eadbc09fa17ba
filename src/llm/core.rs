use crate::llm::request::{GenerateRequest, GenerateResponse};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A custom error type for generative-content operations.
///
/// Every failure that can leave a client surfaces as one of these variants.
/// The retry executor never rewraps them: what `generate` returned is what
/// the caller receives, so the classification stays inspectable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LLMError {
    /// The API credential is missing or the client could not be built.
    ///
    /// Raised before any network attempt and never retried.
    #[error("Satellite uplink failed: {0}")]
    Configuration(String),
    /// The service answered with a structured error envelope.
    #[error("{0}")]
    Api(ApiFailure),
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("Transport failure: {0}")]
    Transport(String),
    /// The service answered but the body could not be decoded.
    #[error("Malformed response: {0}")]
    InvalidResponse(String),
    /// An opaque text error from a client that exposes no structured fields.
    #[error("Failed to prompt the model: {0}")]
    Provider(String),
    /// The caller abandoned the request while it was backing off.
    #[error("Request cancelled during backoff")]
    Cancelled,
}

/// A failure reported by the service itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiFailure {
    /// HTTP status, or the `error.code` field of the envelope.
    pub status: Option<u16>,
    /// RPC status string such as `RESOURCE_EXHAUSTED` or `INVALID_ARGUMENT`.
    pub code: Option<String>,
    pub message: String,
    /// Server hint from a `google.rpc.RetryInfo` detail.
    pub retry_delay: Option<Duration>,
}

impl ApiFailure {
    pub fn new(status: Option<u16>, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            retry_delay: None,
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.code.as_deref()) {
            (Some(status), Some(code)) => write!(f, "[{status} {code}] {}", self.message),
            (Some(status), None) => write!(f, "[{status}] {}", self.message),
            (None, Some(code)) => write!(f, "[{code}] {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

/// How a failure should be treated by the retry executor and by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credential or client setup problem; fail fast.
    Configuration,
    /// Quota exceeded (HTTP 429 / `RESOURCE_EXHAUSTED`); worth retrying.
    RateLimited,
    /// Anything else; surfaced immediately.
    Terminal,
    /// The caller gave up on the request.
    Cancelled,
}

/// Errors that can tell the retry executor whether they are worth retrying.
pub trait Classify {
    fn failure_kind(&self) -> FailureKind;

    fn is_rate_limited(&self) -> bool {
        self.failure_kind() == FailureKind::RateLimited
    }
}

/// Marker produced when a cancellation token fires during a backoff wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl From<Cancelled> for LLMError {
    fn from(_: Cancelled) -> Self {
        LLMError::Cancelled
    }
}

/// A trait that defines the contract for any generative-content client.
///
/// Implementations send one request and return the raw service response. They
/// must not retry internally; retries belong to
/// [`RetryExecutor`](crate::llm::retry::RetryExecutor).
///
/// # Examples
///
/// ```rust
/// use spacescope::llm::{GenerateRequest, GenerateResponse, LLM, LLMError};
/// use async_trait::async_trait;
///
/// struct EchoLLM;
///
/// #[async_trait]
/// impl LLM for EchoLLM {
///     async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LLMError> {
///         Ok(GenerateResponse::from_text(request.prompt_text()))
///     }
/// }
/// ```
///
/// The trait requires `Send + Sync` so a single client can serve concurrent
/// logical calls from different tasks.
#[async_trait]
pub trait LLM: Send + Sync {
    /// Sends one request to the model and returns its response.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LLMError>;
}

#[async_trait]
impl<L: LLM + ?Sized> LLM for Box<L> {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LLMError> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<L: LLM + ?Sized> LLM for std::sync::Arc<L> {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LLMError> {
        (**self).generate(request).await
    }
}
