//! Presentation of analysis outcomes for the terminal.
//!
//! Two forms are supported: a human-readable text report and a JSON document.
//! Both keep failed analyses visibly separate from a `Mixed/Uncertain`
//! verdict.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

use crate::analysis::{AnalysisOutcome, AnalysisResult};
use crate::input::AnalysisInput;

/// Width of the confidence bar in characters.
const BAR_WIDTH: usize = 20;

/// One analysis together with the context it ran in.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub input_kind: String,
    pub input: String,
    pub model: String,
    pub outcome: AnalysisOutcome,
}

impl AnalysisReport {
    pub fn new(input: &AnalysisInput, model: impl Into<String>, outcome: AnalysisOutcome) -> Self {
        Self::from_parts(input.kind().as_str(), input.summary(), model, outcome)
    }

    /// Builds a report when no [`AnalysisInput`] exists, e.g. offline extraction.
    pub fn from_parts(
        input_kind: impl Into<String>,
        input: impl Into<String>,
        model: impl Into<String>,
        outcome: AnalysisOutcome,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            input_kind: input_kind.into(),
            input: input.into(),
            model: model.into(),
            outcome,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Renders a report as plain text.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Input:     {} ({})", report.input, report.input_kind);
    let _ = writeln!(out, "Model:     {}", report.model);

    match &report.outcome {
        AnalysisOutcome::Completed(result) => render_result(&mut out, result),
        AnalysisOutcome::ExtractionFailed { reason, raw } => {
            let _ = writeln!(out, "Status:    ANALYSIS FAILED (unreadable model reply)");
            let _ = writeln!(out, "Reason:    {}", reason);
            let _ = writeln!(out, "Raw reply:");
            for line in raw.lines() {
                let _ = writeln!(out, "  | {}", line);
            }
        }
        AnalysisOutcome::UpstreamFailed { reason } => {
            let _ = writeln!(out, "Status:    ANALYSIS FAILED (model service error)");
            let _ = writeln!(out, "Reason:    {}", reason);
        }
        AnalysisOutcome::InputRejected { reason } => {
            let _ = writeln!(out, "Status:    ANALYSIS FAILED (input rejected)");
            let _ = writeln!(out, "Reason:    {}", reason);
        }
    }

    out
}

fn render_result(out: &mut String, result: &AnalysisResult) {
    let _ = writeln!(out, "Verdict:   {}", result.verdict);
    let _ = writeln!(
        out,
        "AI score:  {} {}%",
        confidence_bar(result.clamped_confidence()),
        result.confidence_score
    );
    let _ = writeln!(
        out,
        "AI-made:   {}",
        if result.is_ai_generated { "yes" } else { "no" }
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Reasoning:");
    let _ = writeln!(out, "  {}", result.reasoning.trim());

    if !result.indicators.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Indicators:");
        for indicator in &result.indicators {
            let _ = writeln!(out, "  - {}", indicator);
        }
    }

    if !result.sources().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sources:");
        for source in result.sources() {
            let _ = writeln!(out, "  - {} <{}>", source.title, source.uri);
        }
    }
}

/// Fixed-width bar such as `[##########..........]` for a 0-100 score.
pub fn confidence_bar(score: u8) -> String {
    let filled = (usize::from(score.min(100)) * BAR_WIDTH + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Grounding, Source, Verdict};

    fn completed(grounding: Grounding) -> AnalysisOutcome {
        AnalysisOutcome::Completed(AnalysisResult {
            is_ai_generated: true,
            confidence_score: 87,
            verdict: Verdict::Ai,
            reasoning: "Formulaic structure".to_string(),
            indicators: vec!["a".to_string(), "b".to_string()],
            grounding,
        })
    }

    #[test]
    fn test_confidence_bar() {
        assert_eq!(confidence_bar(0), format!("[{}]", ".".repeat(20)));
        assert_eq!(confidence_bar(100), format!("[{}]", "#".repeat(20)));
        assert_eq!(confidence_bar(50), format!("[{}{}]", "#".repeat(10), ".".repeat(10)));
    }

    #[test]
    fn test_render_completed() {
        let report = AnalysisReport::from_parts(
            "url",
            "https://example.com",
            "gemini-2.5-flash",
            completed(Grounding::Grounded(vec![Source::new("https://x", "X")])),
        );

        let text = render_text(&report);
        assert!(text.contains("Verdict:   AI"));
        assert!(text.contains("87%"));
        assert!(text.contains("  - a\n"));
        assert!(text.contains("X <https://x>"));
    }

    #[test]
    fn test_render_without_sources_omits_section() {
        let report = AnalysisReport::from_parts("text", "essay", "m", completed(Grounding::None));
        assert!(!render_text(&report).contains("Sources:"));
    }

    #[test]
    fn test_render_failures_are_not_verdicts() {
        let report = AnalysisReport::from_parts(
            "text",
            "essay",
            "m",
            AnalysisOutcome::ExtractionFailed {
                reason: "Malformed payload".to_string(),
                raw: "line one\nline two".to_string(),
            },
        );
        let text = render_text(&report);
        assert!(text.contains("ANALYSIS FAILED"));
        assert!(text.contains("  | line two"));
        assert!(!text.contains("Verdict:"));

        let report = AnalysisReport::from_parts(
            "text",
            "essay",
            "m",
            AnalysisOutcome::UpstreamFailed {
                reason: "Rate limited".to_string(),
            },
        );
        assert!(render_text(&report).contains("model service error"));

        let report = AnalysisReport::from_parts(
            "image",
            "image/png (4096 bytes)",
            "m",
            AnalysisOutcome::InputRejected {
                reason: "Media is 4096 bytes, limit is 8 bytes".to_string(),
            },
        );
        let text = render_text(&report);
        assert!(text.contains("input rejected"));
        assert!(!text.contains("Verdict:"));
    }

    #[test]
    fn test_report_json_shape() {
        let report = AnalysisReport::from_parts("text", "essay", "m", completed(Grounding::None));
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().expect("serialize")).expect("valid json");

        assert_eq!(json["input_kind"], "text");
        assert_eq!(json["outcome"]["status"], "completed");
        assert_eq!(json["outcome"]["verdict"], "AI");
        assert!(json["generated_at"].is_string());
    }
}
