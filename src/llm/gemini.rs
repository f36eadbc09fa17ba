// The `gemini` module talks to the Gemini `generateContent` REST endpoint.

use crate::llm::classify::parse_error_envelope;
use crate::llm::core::{ApiFailure, LLM, LLMError};
use crate::llm::request::{
    GenerateRequest, GenerateResponse, GroundingMetadata, Role, Tool, UsageMetadata, WebSource,
};
use crate::llm::settings::GeminiSettings;
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode, header};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::Client, client::legacy::connect::HttpConnector, rt::TokioExecutor,
};
use rustls::crypto::{CryptoProvider, ring::default_provider};
use rustls::{ClientConfig, RootCertStore};
use tracing::{debug, info, warn};

/// A type alias for the HTTPS connector.
pub type HttpsConnectorType = HttpsConnector<HttpConnector>;
/// A type alias for the Hyper client.
pub type HyperClient = Client<HttpsConnectorType, Full<Bytes>>;

/// Builds the HTTP client used for Gemini calls.
///
/// Plain `http://` is allowed so a local endpoint can stand in for the API.
pub fn build_http_client() -> Result<HyperClient, LLMError> {
    // Another component may already have installed a provider; either is fine.
    let _ = CryptoProvider::install_default(default_provider());

    let builder = match HttpsConnectorBuilder::new().with_native_roots() {
        Ok(builder) => builder,
        Err(e) => {
            // Plain HTTP still works; HTTPS will fail certificate checks.
            warn!(error = %e, "No native TLS roots available");
            HttpsConnectorBuilder::new().with_tls_config(
                ClientConfig::builder()
                    .with_root_certificates(RootCertStore::empty())
                    .with_no_client_auth(),
            )
        }
    };
    let https = builder.https_or_http().enable_http1().build();

    Ok(Client::builder(TokioExecutor::new()).build(https))
}

/// A client for one Gemini endpoint and credential.
pub struct GeminiClient {
    settings: GeminiSettings,
    http: HyperClient,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self, LLMError> {
        let http = build_http_client()?;
        info!(base_url = %settings.base_url, "Gemini client ready");
        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    fn endpoint(&self, model: &str) -> String {
        let model = if model.is_empty() {
            self.settings.default_model.as_str()
        } else {
            model
        };
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl LLM for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LLMError> {
        let uri = self.endpoint(&request.model);
        let body = serde_json::to_vec(&wire::GenerateContentBody::from(&request))
            .map_err(|e| LLMError::InvalidResponse(format!("unserializable request: {e}")))?;

        let http_request = Request::builder()
            .method(Method::POST)
            .uri(&uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-goog-api-key", &self.settings.api_key)
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| LLMError::Configuration(format!("invalid request for {uri}: {e}")))?;

        debug!(uri = %uri, "Sending generateContent request");
        let response = self
            .http
            .request(http_request)
            .await
            .map_err(|e| LLMError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| LLMError::Transport(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(LLMError::Api(api_failure(status, &bytes)));
        }

        let decoded: wire::GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;
        Ok(decoded.into())
    }
}

/// Decode a non-2xx body. The HTTP status is kept even if the body is not a
/// Google error envelope.
fn api_failure(status: StatusCode, body: &[u8]) -> ApiFailure {
    let text = String::from_utf8_lossy(body);
    match parse_error_envelope(&text) {
        Some(mut failure) => {
            failure.status = Some(status.as_u16());
            failure
        }
        None => ApiFailure::new(
            Some(status.as_u16()),
            None,
            status.canonical_reason().unwrap_or("request failed"),
        ),
    }
}

/// JSON shapes of the REST API.
mod wire {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenerateContentBody<'a> {
        pub contents: Vec<WireContent<'a>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub system_instruction: Option<WireContent<'a>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub generation_config: Option<GenerationConfig<'a>>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub tools: Vec<Value>,
    }

    #[derive(Serialize)]
    pub struct WireContent<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub role: Option<&'static str>,
        pub parts: Vec<TextPart<'a>>,
    }

    #[derive(Serialize)]
    pub struct TextPart<'a> {
        pub text: &'a str,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GenerationConfig<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub temperature: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub response_mime_type: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub response_schema: Option<&'a Value>,
    }

    impl<'a> From<&'a GenerateRequest> for GenerateContentBody<'a> {
        fn from(request: &'a GenerateRequest) -> Self {
            let options = &request.options;
            let contents = request
                .contents
                .iter()
                .map(|c| WireContent {
                    role: Some(match c.role {
                        Role::User => "user",
                        Role::Model => "model",
                    }),
                    parts: vec![TextPart { text: &c.text }],
                })
                .collect();

            let system_instruction = options.system_instruction.as_deref().map(|text| WireContent {
                role: None,
                parts: vec![TextPart { text }],
            });

            let generation_config = (options.temperature.is_some()
                || options.response_mime_type.is_some()
                || options.response_schema.is_some())
            .then(|| GenerationConfig {
                temperature: options.temperature,
                response_mime_type: options.response_mime_type.as_deref(),
                response_schema: options.response_schema.as_ref(),
            });

            let tools = options
                .tools
                .iter()
                .map(|tool| match tool {
                    Tool::GoogleSearch => serde_json::json!({ "googleSearch": {} }),
                })
                .collect();

            Self {
                contents,
                system_instruction,
                generation_config,
                tools,
            }
        }
    }

    #[derive(Deserialize, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct GenerateContentResponse {
        pub candidates: Vec<Candidate>,
        pub usage_metadata: Option<Usage>,
    }

    #[derive(Deserialize, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct Candidate {
        pub content: Option<CandidateContent>,
        pub finish_reason: Option<String>,
        pub grounding_metadata: Option<Grounding>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct CandidateContent {
        pub parts: Vec<ResponsePart>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct ResponsePart {
        pub text: Option<String>,
    }

    #[derive(Deserialize, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct Grounding {
        pub web_search_queries: Vec<String>,
        pub grounding_chunks: Vec<GroundingChunk>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct GroundingChunk {
        pub web: Option<WebChunk>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct WebChunk {
        pub uri: Option<String>,
        pub title: Option<String>,
    }

    #[derive(Deserialize, Default)]
    #[serde(rename_all = "camelCase", default)]
    pub struct Usage {
        pub prompt_token_count: u32,
        pub candidates_token_count: u32,
        pub total_token_count: u32,
    }

    impl From<GenerateContentResponse> for GenerateResponse {
        fn from(response: GenerateContentResponse) -> Self {
            let usage = response.usage_metadata.map(|u| UsageMetadata {
                prompt_tokens: u.prompt_token_count,
                candidate_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            });

            let Some(candidate) = response.candidates.into_iter().next() else {
                return GenerateResponse {
                    usage,
                    ..Default::default()
                };
            };

            let text: String = candidate
                .content
                .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
                .unwrap_or_default();

            let grounding = candidate.grounding_metadata.map(|g| GroundingMetadata {
                web_search_queries: g.web_search_queries,
                sources: g
                    .grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.web)
                    .filter_map(|web| {
                        Some(WebSource {
                            uri: web.uri?,
                            title: web.title.unwrap_or_else(|| "Source".to_string()),
                        })
                    })
                    .collect(),
            });

            GenerateResponse {
                text: (!text.is_empty()).then_some(text),
                finish_reason: candidate.finish_reason,
                grounding,
                usage,
            }
        }
    }
}
