//! The analysis flow: input in, tagged outcome out.
//!
//! [`Detector`] shapes a model request from an [`AnalysisInput`], calls the
//! configured [`ModelProvider`], and runs the reply through the extractor.
//! Failures never surface as a verdict; they come back as
//! [`AnalysisOutcome::InputRejected`], [`AnalysisOutcome::UpstreamFailed`] or
//! [`AnalysisOutcome::ExtractionFailed`].

pub mod config;

use std::sync::Arc;

use crate::analysis::AnalysisOutcome;
use crate::error::{InputError, LlmError};
use crate::extraction::extract_analysis;
use crate::input::{AnalysisInput, InputKind, MediaKind};
use crate::llm::{ContentPart, ModelProvider, ModelRequest};
use crate::prompts::build_detection_prompt;

pub use config::{ConfigError, DetectorConfig};

/// Runs content-origin analyses against a model provider.
pub struct Detector {
    provider: Arc<dyn ModelProvider>,
    config: DetectorConfig,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Detector {
    pub fn new(provider: Arc<dyn ModelProvider>, config: DetectorConfig) -> Self {
        Self { provider, config }
    }

    /// Creates a detector with default configuration.
    pub fn with_defaults(provider: Arc<dyn ModelProvider>) -> Self {
        Self::new(provider, DetectorConfig::default())
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Loads media from a path or `data:` URL under the configured size limit.
    pub fn load_media(&self, kind: MediaKind, source: &str) -> Result<AnalysisInput, InputError> {
        AnalysisInput::media_from_source(kind, source, self.config.max_inline_bytes)
    }

    /// Builds the model request for an input.
    ///
    /// Media goes first as inline data, followed by the instruction text. Web
    /// search is only requested for URLs, and only when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::MediaTooLarge`] when media exceeds
    /// `max_inline_bytes`, whatever limit it was loaded with.
    pub fn build_request(&self, input: &AnalysisInput) -> Result<ModelRequest, InputError> {
        if let AnalysisInput::Image(media) | AnalysisInput::Video(media) = input {
            if media.byte_len() > self.config.max_inline_bytes {
                return Err(InputError::MediaTooLarge {
                    size: media.byte_len(),
                    limit: self.config.max_inline_bytes,
                });
            }
        }

        let prompt = build_detection_prompt(input);

        let mut parts = Vec::with_capacity(2);
        if let AnalysisInput::Image(media) | AnalysisInput::Video(media) = input {
            parts.push(ContentPart::inline_data(
                media.mime_type(),
                media.base64_data(),
            ));
        }
        parts.push(ContentPart::text(prompt.user));

        let web_search = input.kind() == InputKind::Url && self.config.enable_url_search;

        Ok(
            ModelRequest::new(self.config.model.clone(), prompt.system, parts)
                .with_temperature(self.config.temperature)
                .with_web_search(web_search)
                .with_json_response(true),
        )
    }

    /// Analyzes one input.
    ///
    /// Never returns an error: every failure is reported as a tagged
    /// [`AnalysisOutcome`] variant. The model call, provider retries
    /// included, is bounded by `request_timeout`.
    pub async fn analyze(&self, input: &AnalysisInput) -> AnalysisOutcome {
        let kind = input.kind();
        tracing::info!(
            kind = %kind,
            model = %self.config.model,
            input = %input.summary(),
            "Starting analysis"
        );

        let request = match self.build_request(input) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(kind = %kind, error = %err, "Input rejected");
                return err.into();
            }
        };

        let deadline = self.config.request_timeout;
        let reply = match tokio::time::timeout(deadline, self.provider.generate(request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                tracing::warn!(kind = %kind, error = %err, "Model call failed");
                return err.into();
            }
            Err(_) => {
                let err = LlmError::RequestFailed(format!(
                    "Request timeout: no reply within {}s",
                    deadline.as_secs_f64()
                ));
                tracing::warn!(kind = %kind, error = %err, "Model call timed out");
                return err.into();
            }
        };

        tracing::debug!(
            kind = %kind,
            model = %reply.model,
            reply_chars = reply.text.len(),
            grounding_chunks = reply.grounding.len(),
            "Received model reply"
        );

        match extract_analysis(&reply.text, &reply.grounding) {
            Ok(result) => {
                tracing::info!(
                    kind = %kind,
                    verdict = %result.verdict,
                    confidence_score = result.confidence_score,
                    sources = result.sources().len(),
                    "Analysis completed"
                );
                AnalysisOutcome::Completed(result)
            }
            Err(err) => {
                tracing::warn!(
                    kind = %kind,
                    error_kind = ?err.kind(),
                    field = err.field().unwrap_or("-"),
                    error = %err,
                    "Could not extract analysis from model reply"
                );
                err.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Grounding, Source, Verdict};
    use crate::extraction::GroundingReference;
    use crate::input::{MediaKind, MediaPayload};
    use crate::llm::ModelReply;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock provider returning a canned reply and recording the request.
    struct MockModelProvider {
        reply: ModelReply,
        last_request: Mutex<Option<ModelRequest>>,
    }

    impl MockModelProvider {
        fn new(text: impl Into<String>) -> Self {
            Self::with_reply(ModelReply::new("mock-model", text))
        }

        fn with_reply(reply: ModelReply) -> Self {
            Self {
                reply,
                last_request: Mutex::new(None),
            }
        }

        fn last_request(&self) -> ModelRequest {
            self.last_request
                .lock()
                .expect("lock not poisoned")
                .clone()
                .expect("a request was sent")
        }
    }

    #[async_trait]
    impl ModelProvider for MockModelProvider {
        async fn generate(&self, request: ModelRequest) -> Result<ModelReply, LlmError> {
            *self.last_request.lock().expect("lock not poisoned") = Some(request);
            Ok(self.reply.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl ModelProvider for FailingProvider {
        async fn generate(&self, _request: ModelRequest) -> Result<ModelReply, LlmError> {
            Err(LlmError::ApiError {
                code: 403,
                message: "API key not valid".to_string(),
            })
        }
    }

    const REPLY: &str = r#"Here is my analysis:
```json
{"isAiGenerated": true, "confidenceScore": 91, "verdict": "AI", "reasoning": "Generic phrasing", "indicators": ["repetition"]}
```"#;

    #[tokio::test]
    async fn test_text_analysis_completes() {
        let provider = Arc::new(MockModelProvider::new(REPLY));
        let detector = Detector::with_defaults(provider.clone());
        let input = AnalysisInput::text("Some essay").expect("valid");

        let outcome = detector.analyze(&input).await;
        let result = outcome.result().expect("completed");
        assert_eq!(result.verdict, Verdict::Ai);
        assert_eq!(result.confidence_score, 91);
        assert_eq!(result.grounding, Grounding::None);

        let request = provider.last_request();
        assert!(!request.web_search);
        assert!(request.json_response);
        assert_eq!(request.model, "gemini-2.5-flash");
        assert_eq!(request.parts.len(), 1);
    }

    #[tokio::test]
    async fn test_url_analysis_uses_search_and_grounding() {
        let reply = ModelReply::new("mock-model", REPLY).with_grounding(vec![
            GroundingReference::web("https://x", Some("X".to_string())),
            GroundingReference::default(),
        ]);
        let provider = Arc::new(MockModelProvider::with_reply(reply));
        let detector = Detector::with_defaults(provider.clone());
        let input = AnalysisInput::url("https://example.com/story").expect("valid");

        let outcome = detector.analyze(&input).await;
        let result = outcome.into_result().expect("completed");
        assert_eq!(result.sources(), &[Source::new("https://x", "X")]);
        assert!(provider.last_request().web_search);
    }

    #[tokio::test]
    async fn test_url_search_can_be_disabled() {
        let provider = Arc::new(MockModelProvider::new(REPLY));
        let detector = Detector::new(
            provider.clone(),
            DetectorConfig::default().with_url_search(false),
        );
        let input = AnalysisInput::url("https://example.com").expect("valid");

        detector.analyze(&input).await;
        assert!(!provider.last_request().web_search);
    }

    #[test]
    fn test_media_request_puts_inline_data_first() {
        let detector = Detector::with_defaults(Arc::new(MockModelProvider::new(REPLY)));
        let payload =
            MediaPayload::from_bytes(MediaKind::Image, "image/png", b"img", 64).expect("ok");
        let request = detector
            .build_request(&AnalysisInput::media(payload))
            .expect("within limit");

        assert_eq!(request.parts.len(), 2);
        assert!(matches!(
            &request.parts[0],
            ContentPart::InlineData { mime_type, .. } if mime_type == "image/png"
        ));
        assert!(matches!(&request.parts[1], ContentPart::Text(_)));
    }

    #[tokio::test]
    async fn test_oversize_media_is_rejected_before_model_call() {
        let provider = Arc::new(MockModelProvider::new(REPLY));
        let detector = Detector::new(
            provider.clone(),
            DetectorConfig::default().with_max_inline_bytes(8),
        );
        let payload = MediaPayload::from_bytes(MediaKind::Image, "image/png", &[0u8; 4096], 1 << 20)
            .expect("within load limit");
        let input = AnalysisInput::media(payload);

        assert!(matches!(
            detector.build_request(&input),
            Err(InputError::MediaTooLarge { size: 4096, limit: 8 })
        ));
        match detector.analyze(&input).await {
            AnalysisOutcome::InputRejected { reason } => assert!(reason.contains("4096")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(provider.last_request.lock().expect("lock not poisoned").is_none());
    }

    #[test]
    fn test_load_media_uses_configured_limit() {
        let detector = Detector::new(
            Arc::new(MockModelProvider::new(REPLY)),
            DetectorConfig::default().with_max_inline_bytes(4),
        );
        let err = detector
            .load_media(MediaKind::Image, "data:image/png;base64,AAAAAAAA")
            .expect_err("six bytes over a four byte limit");
        assert!(matches!(err, InputError::MediaTooLarge { size: 6, limit: 4 }));
    }

    /// Provider that never answers in time.
    struct SlowProvider;

    #[async_trait]
    impl ModelProvider for SlowProvider {
        async fn generate(&self, _request: ModelRequest) -> Result<ModelReply, LlmError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ModelReply::new("slow", REPLY))
        }
    }

    #[tokio::test]
    async fn test_request_timeout_bounds_model_call() {
        let detector = Detector::new(
            Arc::new(SlowProvider),
            DetectorConfig::default().with_request_timeout(Duration::from_millis(20)),
        );
        let input = AnalysisInput::text("essay").expect("valid");

        match detector.analyze(&input).await {
            AnalysisOutcome::UpstreamFailed { reason } => assert!(reason.contains("timeout")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_extraction_failure() {
        let provider = Arc::new(MockModelProvider::new("I'm sorry, I can't analyze that."));
        let detector = Detector::with_defaults(provider);
        let input = AnalysisInput::text("essay").expect("valid");

        match detector.analyze(&input).await {
            AnalysisOutcome::ExtractionFailed { raw, .. } => {
                assert_eq!(raw, "I'm sorry, I can't analyze that.")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_provider_error_is_upstream_failure() {
        let detector = Detector::with_defaults(Arc::new(FailingProvider));
        let input = AnalysisInput::text("essay").expect("valid");

        match detector.analyze(&input).await {
            AnalysisOutcome::UpstreamFailed { reason } => assert!(reason.contains("403")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
