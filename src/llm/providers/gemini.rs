//! Gemini provider implementation.
//!
//! Talks to the `generateContent` endpoint of the Generative Language API.
//! Web search is exposed through the `google_search` tool, and the citations
//! it produces come back as grounding chunks next to the reply text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::LlmError;
use crate::extraction::GroundingReference;
use crate::llm::{ContentPart, ModelProvider, ModelReply, ModelRequest};

/// Default Generative Language API endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model to use if none specified.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff in milliseconds.
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Upper bound for a single backoff delay.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Gemini provider for model requests.
///
/// Constructed explicitly and shared as `Arc<dyn ModelProvider>`; there is no
/// process-wide client.
pub struct GeminiClient {
    /// HTTP client for making API requests.
    client: Client,
    /// API key sent in the `x-goog-api-key` header.
    api_key: String,
    /// Base URL for the API, without trailing slash.
    base_url: String,
    /// Default model to use when none is specified.
    default_model: String,
    max_retries: u32,
    base_retry_delay: Duration,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &self.api_key_masked())
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client with the default model and endpoint.
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Self::with_custom_url(api_key, GEMINI_BASE_URL.to_string(), DEFAULT_MODEL.to_string())
    }

    /// Create a client with a specific default model.
    pub fn with_model(api_key: String, model: String) -> Result<Self, LlmError> {
        Self::with_custom_url(api_key, GEMINI_BASE_URL.to_string(), model)
    }

    /// Create a client against a custom base URL.
    ///
    /// Useful for testing or for API-compatible proxies.
    pub fn with_custom_url(
        api_key: String,
        base_url: String,
        model: String,
    ) -> Result<Self, LlmError> {
        Self::with_options(
            api_key,
            base_url,
            model,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    /// Create a client with every connection setting spelled out.
    pub fn with_options(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: model,
            max_retries: MAX_RETRIES,
            base_retry_delay: Duration::from_millis(BASE_RETRY_DELAY_MS),
        })
    }

    /// Create a client from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `GEMINI_API_KEY` or `GOOGLE_API_KEY`: API key (required)
    /// - `GEMINI_API_BASE`: Base URL (defaults to the public endpoint)
    /// - `GEMINI_MODEL`: Default model (defaults to `gemini-2.5-flash`)
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingApiKey` if no key variable is set.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .map_err(|_| LlmError::MissingApiKey)?;
        let base_url = env::var("GEMINI_API_BASE").unwrap_or_else(|_| GEMINI_BASE_URL.to_string());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self::with_custom_url(api_key, base_url, model)
    }

    /// Override the retry policy. `max_retries` counts total attempts.
    pub fn with_retry_policy(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.base_retry_delay = base_delay;
        self
    }

    /// Get the API key (for debugging, returns masked value).
    pub fn api_key_masked(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 8 {
            "*".repeat(chars.len())
        } else {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the default model.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Execute a request with exponential backoff retry logic.
    async fn execute_with_retry(
        &self,
        model: &str,
        request: &ApiRequest,
    ) -> Result<ModelReply, LlmError> {
        let mut last_error = None;
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = retry_delay(self.base_retry_delay, attempt);
                tokio::time::sleep(delay).await;
                tracing::debug!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying Gemini request after transient failure"
                );
            }

            match self.execute_request(&url, model, request).await {
                Ok(reply) => return Ok(reply),
                Err(err) => {
                    if is_transient_error(&err) {
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries = self.max_retries,
                            error = %err,
                            "Transient error, will retry"
                        );
                        last_error = Some(err);
                    } else {
                        return Err(err);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LlmError::RequestFailed("Max retries exceeded with no error captured".to_string())
        }))
    }

    /// Execute a single request (no retry logic).
    async fn execute_request(
        &self,
        url: &str,
        model: &str,
        request: &ApiRequest,
    ) -> Result<ModelReply, LlmError> {
        let http_response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(describe_request_error)?;

        let status = http_response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = http_response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            let message = serde_json::from_str::<ApiErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);

            if status_code == 429 {
                return Err(LlmError::RateLimited(message));
            }
            return Err(LlmError::ApiError {
                code: status_code,
                message,
            });
        }

        let api_response: ApiResponse = http_response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse API response: {}", e)))?;

        into_reply(api_response, model)
    }
}

/// Exponential backoff before retry number `attempt` (1-based), capped at
/// [`MAX_RETRY_DELAY`].
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_RETRY_DELAY)
}

/// Maps a transport failure to an error whose message names its class, so
/// that transient failures can be recognized.
fn describe_request_error(error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        LlmError::RequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        LlmError::RequestFailed(format!("Connection failed: {}", error))
    } else {
        LlmError::RequestFailed(error.to_string())
    }
}

/// Check if an error is transient and should be retried.
fn is_transient_error(error: &LlmError) -> bool {
    match error {
        LlmError::RequestFailed(msg) => {
            let msg = msg.to_lowercase();
            msg.contains("timeout") || msg.contains("connection") || msg.contains("temporarily")
        }
        LlmError::RateLimited(_) => true,
        LlmError::ApiError { code, .. } => *code >= 500 || *code == 429,
        _ => false,
    }
}

/// Converts the service response into a provider-neutral reply.
fn into_reply(response: ApiResponse, requested_model: &str) -> Result<ModelReply, LlmError> {
    let model = response
        .model_version
        .unwrap_or_else(|| requested_model.to_string());

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(match response.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => LlmError::Blocked(reason),
            None => LlmError::EmptyResponse("no candidates".to_string()),
        });
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse(
            candidate
                .finish_reason
                .unwrap_or_else(|| "unknown".to_string()),
        ));
    }

    let grounding = candidate
        .grounding_metadata
        .map(|metadata| metadata.grounding_chunks)
        .unwrap_or_default();

    Ok(ModelReply {
        model,
        text,
        grounding,
        finish_reason: candidate.finish_reason,
    })
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn generate(&self, request: ModelRequest) -> Result<ModelReply, LlmError> {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        tracing::debug!(
            model = %model,
            parts = request.parts.len(),
            web_search = request.web_search,
            "Sending Gemini generateContent request"
        );

        let api_request = ApiRequest::from(request);
        self.execute_with_retry(&model, &api_request).await
    }
}

/// Internal request structure for the generateContent API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    system_instruction: ApiContent,
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    generation_config: ApiGenerationConfig,
}

impl From<ModelRequest> for ApiRequest {
    fn from(request: ModelRequest) -> Self {
        let parts = request
            .parts
            .into_iter()
            .map(|part| match part {
                ContentPart::Text(text) => ApiPart::Text { text },
                ContentPart::InlineData { mime_type, data } => ApiPart::InlineData {
                    inline_data: ApiInlineData { mime_type, data },
                },
            })
            .collect();

        let tools = if request.web_search {
            vec![ApiTool {
                google_search: ApiGoogleSearch {},
            }]
        } else {
            Vec::new()
        };

        // The service rejects a JSON response type combined with tool use.
        let response_mime_type = (request.json_response && !request.web_search)
            .then(|| "application/json".to_string());

        Self {
            system_instruction: ApiContent {
                role: None,
                parts: vec![ApiPart::Text {
                    text: request.system,
                }],
            },
            contents: vec![ApiContent {
                role: Some("user".to_string()),
                parts,
            }],
            tools,
            generation_config: ApiGenerationConfig {
                temperature: request.temperature,
                response_mime_type,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ApiPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum ApiPart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: ApiInlineData,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTool {
    google_search: ApiGoogleSearch,
}

#[derive(Debug, Clone, Serialize)]
struct ApiGoogleSearch {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

/// Internal response structure from the generateContent API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<ApiPromptFeedback>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    grounding_metadata: Option<ApiGroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseContent {
    #[serde(default)]
    parts: Vec<ApiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ApiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiGroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingReference>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Error response from the API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

/// Error detail from the API.
#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
