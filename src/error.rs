//! Error types for veriscan operations.
//!
//! Defines error types for each subsystem:
//! - Extraction of a structured verdict from a model reply
//! - Model API interactions
//! - Input validation and media loading

use thiserror::Error;

/// Number of characters of raw model output shown in error messages.
const RAW_PREVIEW_CHARS: usize = 100;

/// Errors produced while recovering an analysis result from a model reply.
///
/// Every variant keeps the complete raw reply so callers can log or display
/// it; the `Display` form only shows a short preview.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionError {
    #[error("Malformed payload: {message}. Reply starts with: '{}'", preview(.raw))]
    MalformedPayload { message: String, raw: String },

    #[error("Schema violation on field '{field}': {reason}")]
    SchemaViolation {
        field: String,
        reason: String,
        raw: String,
    },
}

/// Discriminant of an [`ExtractionError`], handy for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    MalformedPayload,
    SchemaViolation,
}

impl ExtractionError {
    pub(crate) fn malformed(message: impl Into<String>, raw: &str) -> Self {
        Self::MalformedPayload {
            message: message.into(),
            raw: raw.to_string(),
        }
    }

    pub(crate) fn schema(field: &str, reason: impl Into<String>, raw: &str) -> Self {
        Self::SchemaViolation {
            field: field.to_string(),
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    pub fn kind(&self) -> ExtractionErrorKind {
        match self {
            Self::MalformedPayload { .. } => ExtractionErrorKind::MalformedPayload,
            Self::SchemaViolation { .. } => ExtractionErrorKind::SchemaViolation,
        }
    }

    /// The untouched model reply the extraction was attempted on.
    pub fn raw(&self) -> &str {
        match self {
            Self::MalformedPayload { raw, .. } | Self::SchemaViolation { raw, .. } => raw,
        }
    }

    /// Name of the offending field for schema violations.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::SchemaViolation { field, .. } => Some(field),
            Self::MalformedPayload { .. } => None,
        }
    }
}

/// Errors that can occur while talking to the hosted model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: set GEMINI_API_KEY or pass --api-key")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse model response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Request blocked by the model service: {0}")]
    Blocked(String),

    #[error("Model returned no text (finish reason: {0})")]
    EmptyResponse(String),
}

/// Errors raised while validating or loading user input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Text input is empty")]
    EmptyText,

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported {expected} type: {found}")]
    UnsupportedMediaType { expected: String, found: String },

    #[error("Media is {size} bytes, limit is {limit} bytes")]
    MediaTooLarge { size: usize, limit: usize },

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn preview(raw: &str) -> String {
    raw.trim().chars().take(RAW_PREVIEW_CHARS).collect()
}
