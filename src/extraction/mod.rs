//! Recovering a structured verdict from a model reply.
//!
//! The model is told to answer with a single JSON object, but replies still
//! arrive wrapped in markdown fences or padded with prose. Extraction runs in
//! three steps:
//!
//! 1. Strip fence markers ([`strip_code_fences`])
//! 2. Cut the reply to the first-`{`-to-last-`}` span ([`extract_json_candidate`])
//! 3. Parse and validate the object, attaching grounding sources ([`extract_analysis`])
//!
//! # Example
//!
//! ```
//! use veriscan::analysis::Verdict;
//! use veriscan::extraction::extract_analysis;
//!
//! let reply = concat!(
//!     "Sure, here is the analysis:\n```json\n",
//!     r#"{"isAiGenerated": false, "confidenceScore": 10, "verdict": "Human", "#,
//!     r#""reasoning": "Idiosyncratic phrasing", "indicators": []}"#,
//!     "\n```"
//! );
//!
//! let result = extract_analysis(reply, &[]).expect("valid reply");
//! assert_eq!(result.verdict, Verdict::Human);
//! assert_eq!(result.confidence_score, 10);
//! ```

pub mod candidate;
pub mod extractor;
pub mod grounding;

pub use candidate::{extract_json_candidate, strip_code_fences};
pub use extractor::extract_analysis;
pub use grounding::{collect_sources, GroundingReference, WebReference};
