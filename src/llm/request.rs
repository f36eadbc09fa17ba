//! Request and response shapes for generative-content calls.
//!
//! These are opaque to the retry executor; it clones the request for each
//! attempt and hands the response back untouched.

use crate::llm::core::LLMError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a turn of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub text: String,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Server-side tools the model may use while answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Ground the answer in Google Search results.
    GoogleSearch,
}

/// Generation options forwarded verbatim to the service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
    pub response_mime_type: Option<String>,
    /// OpenAPI-style schema the service uses to constrain JSON output.
    pub response_schema: Option<Value>,
    pub tools: Vec<Tool>,
}

/// A single logical request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Vec<Content>,
    pub options: GenerationOptions,
}

impl GenerateRequest {
    /// A single-turn request with default options.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            contents: vec![Content::user(prompt)],
            options: GenerationOptions::default(),
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.options.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    /// Ask for `application/json` output constrained by `schema`.
    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.options.response_mime_type = Some("application/json".to_string());
        self.options.response_schema = Some(schema);
        self
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        if !self.options.tools.contains(&tool) {
            self.options.tools.push(tool);
        }
        self
    }

    /// Text of the latest user turn.
    pub fn prompt_text(&self) -> &str {
        self.contents
            .iter()
            .rev()
            .find(|c| c.role == Role::User)
            .map(|c| c.text.as_str())
            .unwrap_or_default()
    }
}

/// A web page the answer was grounded on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    pub title: String,
    pub uri: String,
}

/// Search grounding attached to a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingMetadata {
    pub web_search_queries: Vec<String>,
    pub sources: Vec<WebSource>,
}

/// Token accounting reported by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageMetadata {
    pub prompt_tokens: u32,
    pub candidate_tokens: u32,
    pub total_tokens: u32,
}

/// The raw response of a successful call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResponse {
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub grounding: Option<GroundingMetadata>,
    pub usage: Option<UsageMetadata>,
}

impl GenerateResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Response text, or `fallback` when the model returned nothing.
    pub fn text_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => fallback,
        }
    }

    /// Decode the text as JSON. An empty body decodes from `empty`.
    pub fn parse_json_or<T: DeserializeOwned>(&self, empty: &str) -> Result<T, LLMError> {
        serde_json::from_str(self.text_or(empty))
            .map_err(|e| LLMError::InvalidResponse(format!("unexpected JSON payload: {e}")))
    }

    /// Grounding sources, empty when the answer was not grounded.
    pub fn sources(&self) -> &[WebSource] {
        self.grounding
            .as_ref()
            .map(|g| g.sources.as_slice())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_options() {
        let request = GenerateRequest::new("gemini-3-flash-preview", "hello")
            .with_system_instruction("be brief")
            .with_temperature(0.7)
            .with_json_schema(json!({"type": "STRING"}))
            .with_tool(Tool::GoogleSearch)
            .with_tool(Tool::GoogleSearch);

        assert_eq!(request.prompt_text(), "hello");
        assert_eq!(request.options.system_instruction.as_deref(), Some("be brief"));
        assert_eq!(request.options.temperature, Some(0.7));
        assert_eq!(
            request.options.response_mime_type.as_deref(),
            Some("application/json")
        );
        assert_eq!(request.options.tools, vec![Tool::GoogleSearch]);
    }

    #[test]
    fn text_or_falls_back_on_blank() {
        let blank = GenerateResponse::from_text("  ");
        assert_eq!(blank.text_or("fallback"), "fallback");
        assert_eq!(GenerateResponse::default().text_or("fallback"), "fallback");
        assert_eq!(GenerateResponse::from_text("hi").text_or("fallback"), "hi");
    }

    #[test]
    fn parse_json_reports_invalid_payload() {
        let response = GenerateResponse::from_text("not json");
        let result: Result<Vec<u32>, _> = response.parse_json_or("[]");
        assert!(matches!(result, Err(LLMError::InvalidResponse(_))));

        let empty: Vec<u32> = GenerateResponse::default().parse_json_or("[]").unwrap();
        assert!(empty.is_empty());
    }
}
