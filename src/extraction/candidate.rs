//! Locating the JSON object inside a free-form model reply.
//!
//! Models told to "output only JSON" still wrap the object in markdown fences
//! or surround it with conversational prose. The helpers here remove fence
//! markers and cut the reply down to the outermost `{ ... }` span.
//!
//! # Example
//!
//! ```
//! use veriscan::extraction::extract_json_candidate;
//!
//! let reply = "Sure, here it is:\n```json\n{\"verdict\": \"AI\"}\n```\nAnything else?";
//! assert_eq!(extract_json_candidate(reply), "{\"verdict\": \"AI\"}");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Triple backtick plus an optional language tag (```json, ```JSON5, ```).
const FENCE_PATTERN: &str = r"```[A-Za-z0-9_+.\-]*";

fn fence_regex() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(FENCE_PATTERN).ok()).as_ref()
}

/// Removes every fenced code-block marker, keeping the enclosed content.
///
/// Opening fences lose their language tag as well; nothing else is touched.
pub fn strip_code_fences(content: &str) -> String {
    match fence_regex() {
        Some(re) => re.replace_all(content, "").into_owned(),
        None => content.replace("```", ""),
    }
}

/// Returns the slice of `content` most likely to hold the JSON object.
///
/// After stripping fences, the candidate runs from the first `{` to the last
/// `}` inclusive. When either brace is missing, or they are out of order, the
/// whole cleaned (trimmed) text is returned and left for the parser to reject.
///
/// Running this on its own output returns the output unchanged.
pub fn extract_json_candidate(content: &str) -> String {
    let cleaned = strip_code_fences(content);

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => cleaned[start..=end].to_string(),
        _ => cleaned.trim().to_string(),
    }
}
