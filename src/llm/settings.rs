// The `settings` module reads the Gemini uplink configuration from the
// process environment.

use crate::llm::core::LLMError;
use std::env;
use tracing::debug;

/// Primary variable holding the API credential.
pub const API_KEY_VAR: &str = "API_KEY";
/// Accepted when `API_KEY` is absent.
pub const FALLBACK_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
pub const MODEL_VAR: &str = "GEMINI_MODEL";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Connection settings for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub default_model: String,
}

impl std::fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl GeminiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Load settings from the environment, reading `.env` first if present.
    ///
    /// A missing or blank credential is a configuration error; no request
    /// should be attempted without one.
    pub fn from_env() -> Result<Self, LLMError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LLMError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_blank(API_KEY_VAR)
            .or_else(|| non_blank(FALLBACK_API_KEY_VAR))
            .ok_or_else(|| {
                LLMError::Configuration("API key configuration missing".to_string())
            })?;

        let mut settings = Self::new(api_key.trim());
        if let Some(base_url) = non_blank(BASE_URL_VAR) {
            settings.base_url = base_url;
        }
        if let Some(model) = non_blank(MODEL_VAR) {
            settings.default_model = model;
        }
        debug!(base_url = %settings.base_url, model = %settings.default_model, "Loaded Gemini settings");
        Ok(settings)
    }
}
