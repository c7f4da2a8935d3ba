//! Tagged outcome of a single analysis request.
//!
//! A rejected input, a failed extraction or a failed model call is reported as
//! its own variant.
//! Neither is ever folded into a `Mixed/Uncertain` verdict, so a consumer can
//! always tell "the model was unsure" apart from "the analysis did not happen".

use serde::Serialize;

use super::types::AnalysisResult;
use crate::error::{ExtractionError, InputError, LlmError};

/// Result of running one input through the detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The model answered and its reply validated.
    Completed(AnalysisResult),
    /// The model answered but the reply could not be turned into a result.
    ExtractionFailed { reason: String, raw: String },
    /// The model call itself failed or produced nothing.
    UpstreamFailed { reason: String },
    /// The input broke a configured limit; no model call was made.
    InputRejected { reason: String },
}

impl AnalysisOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, AnalysisOutcome::Completed(_))
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn into_result(self) -> Option<AnalysisResult> {
        match self {
            AnalysisOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    /// Short status label, matching the serialized `status` tag.
    pub fn status(&self) -> &'static str {
        match self {
            AnalysisOutcome::Completed(_) => "completed",
            AnalysisOutcome::ExtractionFailed { .. } => "extraction_failed",
            AnalysisOutcome::UpstreamFailed { .. } => "upstream_failed",
            AnalysisOutcome::InputRejected { .. } => "input_rejected",
        }
    }
}

impl From<Result<AnalysisResult, ExtractionError>> for AnalysisOutcome {
    fn from(result: Result<AnalysisResult, ExtractionError>) -> Self {
        match result {
            Ok(result) => AnalysisOutcome::Completed(result),
            Err(err) => err.into(),
        }
    }
}

impl From<ExtractionError> for AnalysisOutcome {
    fn from(err: ExtractionError) -> Self {
        AnalysisOutcome::ExtractionFailed {
            reason: err.to_string(),
            raw: err.raw().to_string(),
        }
    }
}

impl From<LlmError> for AnalysisOutcome {
    fn from(err: LlmError) -> Self {
        AnalysisOutcome::UpstreamFailed {
            reason: err.to_string(),
        }
    }
}

impl From<InputError> for AnalysisOutcome {
    fn from(err: InputError) -> Self {
        AnalysisOutcome::InputRejected {
            reason: err.to_string(),
        }
    }
}
