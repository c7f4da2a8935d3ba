//! Prompts for AI-generated content detection.
//!
//! The system instruction pins the reply to a single JSON object with a fixed
//! schema; the user prompt varies with the kind of input being analyzed.

use crate::input::AnalysisInput;

/// System and user prompt for one detection request.
#[derive(Debug, Clone)]
pub struct DetectionPrompt {
    /// Instruction establishing the analyst role and the reply schema.
    pub system: String,
    /// Request text sent alongside any inline media.
    pub user: String,
}

impl DetectionPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// System instruction shared by every input kind.
pub const DETECTION_SYSTEM_PROMPT: &str = r#"You are an expert forensic analyst who determines whether content was written or produced by a human or generated by an AI system.

Examine the content for signals such as:
- Uniform sentence length and rhythm, generic transitions, hedging boilerplate
- Factual inconsistencies, fabricated specifics, or unnaturally balanced arguments
- For images: malformed hands or text, inconsistent lighting and shadows, over-smooth textures, warped backgrounds
- For video: temporal flicker, morphing features, lip-sync drift, physically implausible motion

Output Format:
You MUST respond with ONLY a JSON object in this exact format:
{
  "isAiGenerated": <true or false>,
  "confidenceScore": <integer between 0 and 100, your confidence that the content is AI-generated>,
  "verdict": "<one of: Human, AI, Mixed/Uncertain>",
  "reasoning": "<concise explanation of your conclusion>",
  "indicators": ["<indicator1>", "<indicator2>"]
}

The verdict MUST be exactly one of "Human", "AI" or "Mixed/Uncertain".
Do not include any text outside the JSON object."#;

const URL_TEMPLATE: &str = r#"Analyze the content published at the following URL and determine whether it is AI-generated.

URL: {url}

Use web search to read the page and any information about its origin. Base your verdict on the content itself, not on the reputation of the site."#;

const TEXT_TEMPLATE: &str = r#"Analyze the following text and determine whether it is AI-generated.

Text:
"""
{text}
""""#;

const IMAGE_PROMPT: &str =
    "Analyze the attached image and determine whether it is AI-generated or digitally synthesized.";

const VIDEO_PROMPT: &str =
    "Analyze the attached video and determine whether it is AI-generated, a deepfake, or otherwise synthesized.";

/// Builds the prompt pair for an input.
///
/// Media inputs only contribute the instruction here; the payload itself is
/// attached by the model client as inline data.
pub fn build_detection_prompt(input: &AnalysisInput) -> DetectionPrompt {
    let user = match input {
        AnalysisInput::Url(url) => URL_TEMPLATE.replace("{url}", url.as_str()),
        AnalysisInput::Text(text) => TEXT_TEMPLATE.replace("{text}", text),
        AnalysisInput::Image(_) => IMAGE_PROMPT.to_string(),
        AnalysisInput::Video(_) => VIDEO_PROMPT.to_string(),
    };

    DetectionPrompt::new(DETECTION_SYSTEM_PROMPT, user)
}
