//! Detector flow against scripted model providers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use veriscan::extraction::GroundingReference;
use veriscan::llm::{ModelProvider, ModelReply, ModelRequest};
use veriscan::input::AnalysisInput;
use veriscan::render::{render_text, AnalysisReport};
use veriscan::{AnalysisOutcome, Detector, DetectorConfig, LlmError, Verdict};

/// Replays a fixed sequence of responses, one per call.
struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ModelReply, LlmError>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<ModelReply, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn generate(&self, _request: ModelRequest) -> Result<ModelReply, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .expect("lock not poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::EmptyResponse("script exhausted".to_string())))
    }
}

fn reply(text: &str) -> Result<ModelReply, LlmError> {
    Ok(ModelReply::new("scripted", text))
}

#[tokio::test]
async fn test_outcomes_for_each_reply_shape() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        reply(r#"{"isAiGenerated": false, "confidenceScore": 12, "verdict": "Human", "reasoning": "Personal anecdotes"}"#),
        reply("The text reads as human-written."),
        Err(LlmError::RateLimited("quota exceeded".to_string())),
    ]));
    let detector = Detector::new(provider.clone(), DetectorConfig::default());
    let input = AnalysisInput::text("A short diary entry.").expect("valid input");

    let first = detector.analyze(&input).await;
    assert_eq!(first.result().map(|r| r.verdict), Some(Verdict::Human));

    let second = detector.analyze(&input).await;
    assert!(matches!(second, AnalysisOutcome::ExtractionFailed { .. }));

    let third = detector.analyze(&input).await;
    assert!(matches!(third, AnalysisOutcome::UpstreamFailed { .. }));

    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_url_report_lists_sources() {
    let grounded = ModelReply::new(
        "scripted",
        r#"{"isAiGenerated": true, "confidenceScore": 64, "verdict": "Mixed/Uncertain", "reasoning": "Edited press release", "indicators": ["boilerplate"]}"#,
    )
    .with_grounding(vec![GroundingReference::web(
        "https://press.example/release",
        Some("Press".to_string()),
    )]);
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(grounded)]));
    let detector = Detector::with_defaults(provider);
    let input = AnalysisInput::url("https://example.com/news").expect("valid input");

    let outcome = detector.analyze(&input).await;
    let report = AnalysisReport::new(&input, "scripted", outcome);
    let text = render_text(&report);

    assert!(text.contains("Mixed/Uncertain"));
    assert!(text.contains("Press <https://press.example/release>"));

    let json: serde_json::Value =
        serde_json::from_str(&report.to_json().expect("serialize")).expect("valid json");
    assert_eq!(json["outcome"]["status"], "completed");
    assert_eq!(json["outcome"]["sources"][0]["uri"], "https://press.example/release");
}
