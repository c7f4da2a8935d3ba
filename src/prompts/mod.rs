//! Model prompts for content-origin analysis.
//!
//! - [`detection`] - System instruction with the reply schema and per-input user prompts

pub mod detection;

pub use detection::{build_detection_prompt, DetectionPrompt, DETECTION_SYSTEM_PROMPT};
