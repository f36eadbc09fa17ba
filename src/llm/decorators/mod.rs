//! LLM decorators for adding functionality to base LLM implementations.
//!
//! Decorators implement the [`LLM`](crate::llm::LLM) trait themselves and wrap
//! another implementation, adding their behaviour transparently.
//!
//! # Available Decorators
//!
//! - **Retry**: rate-limit aware retries with exponential backoff and jitter
pub mod retry;

pub use retry::{BoxedRetryLLM, RetryingLLM};
