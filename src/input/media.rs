//! Inline media payloads for image and video analysis.
//!
//! Media is sent to the model inline as base64, so files are read whole and
//! checked against a size limit before encoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::InputError;

/// Inline payload limit applied when nothing else is configured (20 MiB).
pub const DEFAULT_MAX_INLINE_BYTES: usize = 20 * 1024 * 1024;

/// Supported image extensions and the MIME type each maps to.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
];

/// Supported video extensions and the MIME type each maps to.
const VIDEO_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("webm", "video/webm"),
    ("wmv", "video/x-ms-wmv"),
    ("flv", "video/x-flv"),
    ("3gp", "video/3gpp"),
];

/// Which kind of media a payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    fn supported_types(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            MediaKind::Image => IMAGE_TYPES,
            MediaKind::Video => VIDEO_TYPES,
        }
    }

    /// Resolves a file extension to a MIME type of this kind.
    pub fn mime_for_extension(&self, extension: &str) -> Option<&'static str> {
        self.supported_types()
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, mime)| *mime)
    }

    /// Resolves a MIME type to its canonical form if this kind supports it.
    ///
    /// Paths and data URLs go through the same table, so a type is accepted
    /// only if some supported extension maps to it.
    pub fn supports_mime(&self, mime: &str) -> Option<&'static str> {
        let mime = mime.trim();
        self.supported_types()
            .iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(mime))
            .map(|(_, known)| *known)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base64-encoded media ready to be sent inline.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaPayload {
    kind: MediaKind,
    mime_type: String,
    data: String,
    byte_len: usize,
}

impl fmt::Debug for MediaPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaPayload")
            .field("kind", &self.kind)
            .field("mime_type", &self.mime_type)
            .field("byte_len", &self.byte_len)
            .finish_non_exhaustive()
    }
}

impl MediaPayload {
    /// Wraps raw bytes, enforcing the MIME kind and size limit.
    pub fn from_bytes(
        kind: MediaKind,
        mime_type: impl Into<String>,
        bytes: &[u8],
        max_bytes: usize,
    ) -> Result<Self, InputError> {
        let requested = mime_type.into();
        let Some(mime_type) = kind.supports_mime(&requested) else {
            return Err(InputError::UnsupportedMediaType {
                expected: kind.as_str().to_string(),
                found: requested,
            });
        };
        if bytes.len() > max_bytes {
            return Err(InputError::MediaTooLarge {
                size: bytes.len(),
                limit: max_bytes,
            });
        }

        Ok(Self {
            kind,
            mime_type: mime_type.to_string(),
            data: BASE64.encode(bytes),
            byte_len: bytes.len(),
        })
    }

    /// Reads a media file, inferring its MIME type from the extension.
    pub fn from_path(
        kind: MediaKind,
        path: impl AsRef<Path>,
        max_bytes: usize,
    ) -> Result<Self, InputError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let mime = kind
            .mime_for_extension(extension)
            .ok_or_else(|| InputError::UnsupportedMediaType {
                expected: kind.as_str().to_string(),
                found: if extension.is_empty() {
                    path.display().to_string()
                } else {
                    format!(".{}", extension)
                },
            })?;

        // Check the size before reading a file that would be rejected anyway.
        let size = std::fs::metadata(path)?.len() as usize;
        if size > max_bytes {
            return Err(InputError::MediaTooLarge {
                size,
                limit: max_bytes,
            });
        }

        let bytes = std::fs::read(path)?;
        Self::from_bytes(kind, mime, &bytes, max_bytes)
    }

    /// Parses a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(
        kind: MediaKind,
        data_url: &str,
        max_bytes: usize,
    ) -> Result<Self, InputError> {
        let re = data_url_regex().ok_or_else(|| {
            InputError::InvalidDataUrl("data URL pattern unavailable".to_string())
        })?;
        let caps = re.captures(data_url.trim()).ok_or_else(|| {
            InputError::InvalidDataUrl("expected data:<mime>;base64,<payload>".to_string())
        })?;

        let mime = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let payload = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| InputError::InvalidDataUrl(format!("bad base64 payload: {}", e)))?;

        Self::from_bytes(kind, mime, &bytes, max_bytes)
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 payload without the data-URL prefix.
    pub fn base64_data(&self) -> &str {
        &self.data
    }

    /// Size of the decoded media in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

fn data_url_regex() -> Option<&'static Regex> {
    static DATA_URL: OnceLock<Option<Regex>> = OnceLock::new();
    DATA_URL
        .get_or_init(|| Regex::new(r"^data:([A-Za-z0-9.+\-]+/[A-Za-z0-9.+\-]+);base64,(.*)$").ok())
        .as_ref()
}
