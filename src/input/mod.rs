//! User input accepted for analysis.
//!
//! Inputs are validated on construction, so a value of [`AnalysisInput`] is
//! always safe to send: text is non-blank, URLs are absolute `http(s)` URLs,
//! and media has been type-checked and size-limited.

pub mod media;

use reqwest::Url;
use std::fmt;

use crate::error::InputError;

pub use media::{MediaKind, MediaPayload, DEFAULT_MAX_INLINE_BYTES};

/// One piece of content to classify.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisInput {
    Url(Url),
    Text(String),
    Image(MediaPayload),
    Video(MediaPayload),
}

/// The four input categories, without their payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Url,
    Text,
    Image,
    Video,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Url => "url",
            InputKind::Text => "text",
            InputKind::Image => "image",
            InputKind::Video => "video",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AnalysisInput {
    /// Validates and wraps a URL. Only absolute `http`/`https` URLs with a host
    /// are accepted.
    pub fn url(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        let invalid = |reason: &str| InputError::InvalidUrl {
            url: trimmed.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host"));
        }

        Ok(AnalysisInput::Url(url))
    }

    /// Wraps a block of text, rejecting blank input. The text is kept as given.
    pub fn text(text: impl Into<String>) -> Result<Self, InputError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(InputError::EmptyText);
        }
        Ok(AnalysisInput::Text(text))
    }

    /// Wraps a media payload under the matching variant.
    pub fn media(payload: MediaPayload) -> Self {
        match payload.kind() {
            MediaKind::Image => AnalysisInput::Image(payload),
            MediaKind::Video => AnalysisInput::Video(payload),
        }
    }

    /// Loads media from either a file path or a `data:` URL.
    pub fn media_from_source(
        kind: MediaKind,
        source: &str,
        max_bytes: usize,
    ) -> Result<Self, InputError> {
        let payload = if source.trim_start().starts_with("data:") {
            MediaPayload::from_data_url(kind, source, max_bytes)?
        } else {
            MediaPayload::from_path(kind, source, max_bytes)?
        };
        Ok(Self::media(payload))
    }

    pub fn kind(&self) -> InputKind {
        match self {
            AnalysisInput::Url(_) => InputKind::Url,
            AnalysisInput::Text(_) => InputKind::Text,
            AnalysisInput::Image(_) => InputKind::Image,
            AnalysisInput::Video(_) => InputKind::Video,
        }
    }

    /// Short human-readable description for logs and report headers.
    pub fn summary(&self) -> String {
        match self {
            AnalysisInput::Url(url) => url.to_string(),
            AnalysisInput::Text(text) => {
                let chars = text.chars().count();
                let preview: String = text.trim().chars().take(60).collect();
                if chars > 60 {
                    format!("{}... ({} chars)", preview, chars)
                } else {
                    preview
                }
            }
            AnalysisInput::Image(media) | AnalysisInput::Video(media) => {
                format!("{} ({} bytes)", media.mime_type(), media.byte_len())
            }
        }
    }
}
