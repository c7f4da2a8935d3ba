//! Core result types for AI-content analysis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Title used for a source the model cited without a page title.
pub const DEFAULT_SOURCE_TITLE: &str = "Source";

/// Three-way classification attached to an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Human")]
    Human,
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "Mixed/Uncertain")]
    MixedUncertain,
}

impl Verdict {
    /// All verdicts, in the order the model is told about them.
    pub const ALL: [Verdict; 3] = [Verdict::Human, Verdict::Ai, Verdict::MixedUncertain];

    /// Returns the wire literal for this verdict.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Human => "Human",
            Verdict::Ai => "AI",
            Verdict::MixedUncertain => "Mixed/Uncertain",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    /// Parses one of the exact wire literals. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verdict::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown verdict '{}', expected one of: Human, AI, Mixed/Uncertain",
                    s
                )
            })
    }
}

/// A web page the model consulted while grounding a URL analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

impl Source {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
        }
    }
}

/// Whether an analysis was backed by a web search.
///
/// Serialized as a plain list of sources; `None` serializes as an empty list
/// and is skipped entirely on [`AnalysisResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Source>", into = "Vec<Source>")]
pub enum Grounding {
    #[default]
    None,
    Grounded(Vec<Source>),
}

impl Grounding {
    /// Builds a grounding from collected sources, `None` when the list is empty.
    pub fn from_sources(sources: Vec<Source>) -> Self {
        if sources.is_empty() {
            Grounding::None
        } else {
            Grounding::Grounded(sources)
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Grounding::None)
    }

    pub fn sources(&self) -> &[Source] {
        match self {
            Grounding::None => &[],
            Grounding::Grounded(sources) => sources,
        }
    }
}

impl From<Vec<Source>> for Grounding {
    fn from(sources: Vec<Source>) -> Self {
        Grounding::from_sources(sources)
    }
}

impl From<Grounding> for Vec<Source> {
    fn from(grounding: Grounding) -> Self {
        match grounding {
            Grounding::None => Vec::new(),
            Grounding::Grounded(sources) => sources,
        }
    }
}

/// The validated verdict recovered from a model reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub is_ai_generated: bool,
    /// Conventionally 0-100; the model is not forced to respect that range.
    pub confidence_score: i64,
    pub verdict: Verdict,
    pub reasoning: String,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(rename = "sources", default, skip_serializing_if = "Grounding::is_none")]
    pub grounding: Grounding,
}

impl AnalysisResult {
    /// Confidence score clamped into the displayable 0-100 range.
    pub fn clamped_confidence(&self) -> u8 {
        self.confidence_score.clamp(0, 100) as u8
    }

    pub fn sources(&self) -> &[Source] {
        self.grounding.sources()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result(grounding: Grounding) -> AnalysisResult {
        AnalysisResult {
            is_ai_generated: true,
            confidence_score: 87,
            verdict: Verdict::Ai,
            reasoning: "uniform sentence rhythm".to_string(),
            indicators: vec!["a".to_string()],
            grounding,
        }
    }

    #[test]
    fn test_verdict_literals() {
        assert_eq!("Human".parse::<Verdict>(), Ok(Verdict::Human));
        assert_eq!("AI".parse::<Verdict>(), Ok(Verdict::Ai));
        assert_eq!(
            "Mixed/Uncertain".parse::<Verdict>(),
            Ok(Verdict::MixedUncertain)
        );
        assert!("ai".parse::<Verdict>().is_err());
        assert!("Mixed".parse::<Verdict>().is_err());
        assert!("Robot".parse::<Verdict>().is_err());
    }

    #[test]
    fn test_verdict_serde_uses_wire_literals() {
        let json = serde_json::to_string(&Verdict::MixedUncertain).expect("serialize");
        assert_eq!(json, "\"Mixed/Uncertain\"");
        let parsed: Verdict = serde_json::from_str("\"AI\"").expect("deserialize");
        assert_eq!(parsed, Verdict::Ai);
    }

    #[test]
    fn test_grounding_from_sources() {
        assert!(Grounding::from_sources(Vec::new()).is_none());
        let grounded = Grounding::from_sources(vec![Source::new("https://x", "X")]);
        assert_eq!(grounded.sources().len(), 1);
    }

    #[test]
    fn test_result_serialization_omits_missing_sources() {
        let json = serde_json::to_value(sample_result(Grounding::None)).expect("serialize");
        assert_eq!(json["isAiGenerated"], true);
        assert_eq!(json["confidenceScore"], 87);
        assert_eq!(json["verdict"], "AI");
        assert!(json.get("sources").is_none());

        let grounded = sample_result(Grounding::Grounded(vec![Source::new("https://x", "X")]));
        let json = serde_json::to_value(grounded).expect("serialize");
        assert_eq!(json["sources"][0]["uri"], "https://x");
    }

    #[test]
    fn test_clamped_confidence() {
        let mut result = sample_result(Grounding::None);
        result.confidence_score = 140;
        assert_eq!(result.clamped_confidence(), 100);
        result.confidence_score = -3;
        assert_eq!(result.clamped_confidence(), 0);
    }
}
