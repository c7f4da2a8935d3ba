//! veriscan: ask a hosted model whether content was made by a human or by AI.
//!
//! The library turns a URL, text, image or video into a model request, sends
//! it through a [`llm::ModelProvider`], and converts the free-form reply into
//! a validated [`analysis::AnalysisResult`]. Every run ends in a tagged
//! [`analysis::AnalysisOutcome`] so callers can tell a real verdict apart from
//! a failed analysis.

// Core modules
pub mod analysis;
pub mod cli;
pub mod detector;
pub mod error;
pub mod extraction;
pub mod input;
pub mod llm;
pub mod prompts;
pub mod render;

// Re-export commonly used types
pub use analysis::{AnalysisOutcome, AnalysisResult, Grounding, Source, Verdict};
pub use detector::{Detector, DetectorConfig};
pub use error::{ExtractionError, InputError, LlmError};
pub use extraction::extract_analysis;
