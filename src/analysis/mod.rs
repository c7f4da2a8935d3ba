//! Analysis result model.
//!
//! [`AnalysisResult`] is what the extractor produces from a model reply;
//! [`AnalysisOutcome`] is what the detector hands back for each request.

pub mod outcome;
pub mod types;

pub use outcome::AnalysisOutcome;
pub use types::{AnalysisResult, Grounding, Source, Verdict, DEFAULT_SOURCE_TITLE};
