//! Integration tests for the Gemini client.
//!
//! These tests make real API calls to the Gemini API.
//! Run with: GEMINI_API_KEY=your_key cargo test --test llm_integration -- --ignored

use std::sync::Arc;

use veriscan::input::AnalysisInput;
use veriscan::llm::{ContentPart, GeminiClient, ModelProvider, ModelRequest};
use veriscan::{Detector, DetectorConfig};

fn create_test_client() -> GeminiClient {
    GeminiClient::from_env()
        .expect("GEMINI_API_KEY environment variable must be set for integration tests")
}

#[tokio::test]
#[ignore] // Run with: cargo test --test llm_integration -- --ignored
async fn test_simple_generation() {
    let client = create_test_client();
    let request = ModelRequest::new(
        client.default_model().to_string(),
        "You are a helpful assistant. Reply concisely.",
        vec![ContentPart::text("What is 2 + 2? Reply with just the number.")],
    )
    .with_temperature(0.0);

    let reply = client.generate(request).await;
    assert!(reply.is_ok(), "Generation failed: {:?}", reply.err());

    let reply = reply.expect("Should have reply");
    assert!(
        reply.text.contains('4'),
        "Reply should contain '4', got: {}",
        reply.text
    );
}

#[tokio::test]
#[ignore]
async fn test_text_analysis_completes() {
    let detector = Detector::new(Arc::new(create_test_client()), DetectorConfig::default());
    let input = AnalysisInput::text(
        "In today's fast-paced world, it is important to note that technology plays a \
         pivotal role in shaping our lives. Furthermore, embracing innovation unlocks \
         countless opportunities for growth.",
    )
    .expect("valid input");

    let outcome = detector.analyze(&input).await;
    assert!(outcome.is_completed(), "Analysis failed: {:?}", outcome);
}

#[tokio::test]
#[ignore]
async fn test_url_analysis_reports_sources() {
    let detector = Detector::new(Arc::new(create_test_client()), DetectorConfig::default());
    let input = AnalysisInput::url("https://www.rust-lang.org/").expect("valid input");

    let outcome = detector.analyze(&input).await;
    let result = outcome.into_result().expect("analysis should complete");
    // Grounding depends on whether the model chose to search.
    for source in result.sources() {
        assert!(!source.uri.is_empty());
        assert!(!source.title.is_empty());
    }
}
