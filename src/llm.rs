// The `llm` module provides the generative-content client contract, the
// Gemini REST client, and rate-limit retry around it.

pub mod classify;
pub mod config;
pub mod core;
pub mod decorators;
pub mod factory;
pub mod gemini;
pub mod request;
pub mod retry;
pub mod service;
pub mod settings;

pub use config::RetryConfig;
pub use self::core::{ApiFailure, Cancelled, Classify, FailureKind, LLM, LLMError};
pub use decorators::{BoxedRetryLLM, RetryingLLM};
pub use factory::{ClientFactory, EnvGeminiFactory, LLMFactory, StaticGeminiFactory};
pub use gemini::GeminiClient;
pub use request::{
    Content, GenerateRequest, GenerateResponse, GenerationOptions, GroundingMetadata, Role, Tool,
    UsageMetadata, WebSource,
};
pub use retry::{AttemptState, Jitter, NoJitter, RandomJitter, RetryExecutor};
pub use service::GenerationService;
pub use settings::GeminiSettings;
