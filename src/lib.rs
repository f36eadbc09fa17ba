//! # SpaceScope: Gemini uplink for the SpaceScope learning platform.
//!
//! Every generation call goes through a retry executor that backs off
//! exponentially, with additive jitter, while the service reports quota
//! exhaustion (HTTP 429 / `RESOURCE_EXHAUSTED`).

/// The `chat` module keeps a conversation with the navigator persona.
pub mod chat;
/// The `llm` module provides the client contract, the Gemini client and retries.
pub mod llm;
/// The `notice` module turns failures into user-facing messages.
pub mod notice;
/// The `prompts` module builds the requests the platform sends.
pub mod prompts;
/// The `shutdown` module links shutdown signals to request cancellation.
pub mod shutdown;
/// The `utils` module provides the prompt template engine.
pub mod utils;

pub use chat::{ChatMessage, ChatReply, ChatSession};
pub use llm::{GenerationService, LLMError, RetryConfig, RetryExecutor};
pub use notice::FailureNotice;
pub use prompts::{PromptCatalog, PromptError};
pub use shutdown::{CtrlCShutdown, Shutdown, TimeBasedShutdown, cancel_on_signal};
