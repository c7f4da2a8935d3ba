//! Provider-neutral request and reply types for the hosted model.
//!
//! Callers build a [`ModelRequest`], hand it to any [`ModelProvider`], and get
//! back a [`ModelReply`] holding the completion text and, for search-augmented
//! calls, the grounding side channel.

use async_trait::async_trait;

use crate::error::LlmError;
use crate::extraction::GroundingReference;

/// One piece of user content in a request.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// Base64 media sent inline with its MIME type.
    InlineData { mime_type: String, data: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        ContentPart::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// Request for a single completion.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// Model identifier; empty means the provider's default.
    pub model: String,
    /// System instruction.
    pub system: String,
    /// User content, in order.
    pub parts: Vec<ContentPart>,
    /// Sampling temperature (0.0 - 2.0).
    pub temperature: Option<f64>,
    /// Let the model consult web search and report grounding.
    pub web_search: bool,
    /// Ask the service to constrain the reply to JSON.
    pub json_response: bool,
}

impl ModelRequest {
    pub fn new(model: impl Into<String>, system: impl Into<String>, parts: Vec<ContentPart>) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            parts,
            temperature: None,
            web_search: false,
            json_response: false,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    pub fn with_json_response(mut self, enabled: bool) -> Self {
        self.json_response = enabled;
        self
    }
}

/// Completion returned by a provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    /// Model that produced the reply.
    pub model: String,
    /// Concatenated completion text.
    pub text: String,
    /// Grounding chunks reported alongside the text, possibly empty.
    pub grounding: Vec<GroundingReference>,
    /// Why generation stopped (e.g. "STOP", "MAX_TOKENS").
    pub finish_reason: Option<String>,
}

impl ModelReply {
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
            grounding: Vec::new(),
            finish_reason: None,
        }
    }

    pub fn with_grounding(mut self, grounding: Vec<GroundingReference>) -> Self {
        self.grounding = grounding;
        self
    }
}

/// A hosted model that can answer a [`ModelRequest`].
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate a completion for the request.
    async fn generate(&self, request: ModelRequest) -> Result<ModelReply, LlmError>;
}
