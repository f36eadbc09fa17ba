//! Classify client errors into retry decisions.
//!
//! Structured fields (HTTP status, RPC status code) win. Only when an error
//! carries none of them do we fall back to reading its text: first as an
//! embedded Google JSON error envelope, then as a plain substring match.

use crate::llm::core::{ApiFailure, Classify, FailureKind, LLMError};
use serde_json::Value;
use std::time::Duration;

/// RPC status the Gemini API uses for quota exhaustion.
pub const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";
/// HTTP status for "too many requests".
pub const TOO_MANY_REQUESTS: u16 = 429;

const RETRY_INFO_TYPE: &str = "type.googleapis.com/google.rpc.RetryInfo";

/// Classify structured status/code fields. `None` when neither is present.
pub fn classify_status(status: Option<u16>, code: Option<&str>) -> Option<FailureKind> {
    if status.is_none() && code.is_none() {
        return None;
    }
    let throttled = status == Some(TOO_MANY_REQUESTS)
        || code.is_some_and(|c| c.contains(RESOURCE_EXHAUSTED));
    Some(if throttled {
        FailureKind::RateLimited
    } else {
        FailureKind::Terminal
    })
}

/// Heuristic for free text: the source of the error exposes nothing else.
pub fn classify_message(message: &str) -> FailureKind {
    if let Some(failure) = parse_error_envelope(message) {
        if let Some(kind) = classify_status(failure.status, failure.code.as_deref()) {
            return kind;
        }
    }
    if message.contains("429") || message.contains(RESOURCE_EXHAUSTED) {
        FailureKind::RateLimited
    } else {
        FailureKind::Terminal
    }
}

/// Parse a Google API error envelope:
/// `{"error": {"code": 429, "status": "RESOURCE_EXHAUSTED", "message": "...", "details": [...]}}`.
///
/// Leading text before the first `{` is ignored so that messages like
/// `"Failed to prompt the model: {...}"` still parse.
pub fn parse_error_envelope(text: &str) -> Option<ApiFailure> {
    let start = text.find('{')?;
    let json: Value = serde_json::from_str(&text[start..]).ok()?;
    let error = json.get("error")?;

    let status = error["code"].as_u64().and_then(|c| u16::try_from(c).ok());
    let code = error["status"].as_str().map(str::to_owned);
    let message = error["message"].as_str().unwrap_or_default().to_owned();

    let mut failure = ApiFailure::new(status, code, message);
    if let Some(delay) = retry_delay(error) {
        failure = failure.with_retry_delay(delay);
    }
    Some(failure)
}

fn retry_delay(error: &Value) -> Option<Duration> {
    error["details"]
        .as_array()?
        .iter()
        .filter(|detail| detail["@type"].as_str() == Some(RETRY_INFO_TYPE))
        .filter_map(|detail| detail["retryDelay"].as_str())
        .find_map(|delay| humantime::parse_duration(delay).ok())
}

impl Classify for ApiFailure {
    fn failure_kind(&self) -> FailureKind {
        classify_status(self.status, self.code.as_deref())
            .unwrap_or_else(|| classify_message(&self.message))
    }
}

impl Classify for LLMError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            LLMError::Configuration(_) => FailureKind::Configuration,
            LLMError::Api(failure) => failure.failure_kind(),
            LLMError::Provider(message) => classify_message(message),
            LLMError::Transport(_) | LLMError::InvalidResponse(_) => FailureKind::Terminal,
            LLMError::Cancelled => FailureKind::Cancelled,
        }
    }
}

impl LLMError {
    /// Server-suggested wait, when the failure carried one.
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            LLMError::Api(failure) => failure.retry_delay,
            LLMError::Provider(message) => parse_error_envelope(message)?.retry_delay,
            _ => None,
        }
    }
}
