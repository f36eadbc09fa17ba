//! A conversation with the navigator persona.

use crate::llm::request::Role;
use crate::llm::service::GenerationService;
use crate::notice::FailureNotice;
use crate::prompts::PromptCatalog;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const GREETING: &str =
    "Telemetry link established. I am your AI Navigator. How can I assist your exploration today?";

/// Shown when the model answers with no text.
pub const EMPTY_REPLY: &str =
    "I've encountered a solar flare in my logic circuits. Could you repeat that?";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn now(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Result of one exchange. `notice` is set when the model could not be
/// reached and `text` holds the notice wording instead of a model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    pub notice: Option<FailureNotice>,
}

pub struct ChatSession {
    service: GenerationService,
    catalog: PromptCatalog,
    transcript: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(service: GenerationService, catalog: PromptCatalog) -> Self {
        Self {
            service,
            catalog,
            transcript: vec![ChatMessage::now(Role::Model, GREETING)],
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Send one user message. Blank input is ignored and returns `None`.
    pub async fn send(&mut self, input: &str) -> Option<ChatReply> {
        self.send_cancellable(input, &CancellationToken::new()).await
    }

    pub async fn send_cancellable(
        &mut self,
        input: &str,
        cancel: &CancellationToken,
    ) -> Option<ChatReply> {
        let message = input.trim();
        if message.is_empty() {
            return None;
        }
        self.transcript.push(ChatMessage::now(Role::User, message));

        let request = self.catalog.chat(message);
        let reply = match self.service.generate_cancellable(request, cancel).await {
            Ok(response) => ChatReply {
                text: response.text_or(EMPTY_REPLY).to_string(),
                notice: None,
            },
            Err(e) => {
                let notice = FailureNotice::from_error(&e);
                warn!(error = %e, headline = notice.headline(), "Navigator reply failed");
                ChatReply {
                    text: notice.message(),
                    notice: Some(notice),
                }
            }
        };

        if reply.notice != Some(FailureNotice::Cancelled) {
            self.transcript
                .push(ChatMessage::now(Role::Model, reply.text.as_str()));
        }
        info!(messages = self.transcript.len(), "Chat transcript updated");
        Some(reply)
    }
}
