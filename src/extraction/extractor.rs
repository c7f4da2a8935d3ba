//! Validating a model reply into an [`AnalysisResult`].

use serde_json::{Map, Value};

use super::candidate::extract_json_candidate;
use super::grounding::{collect_sources, GroundingReference};
use crate::analysis::{AnalysisResult, Verdict};
use crate::error::ExtractionError;

/// Turns a raw model reply into a validated [`AnalysisResult`].
///
/// `grounding` is the citation side channel returned next to the reply; pass
/// an empty slice when the call was not search-augmented.
///
/// The function is pure. Every failure carries the untouched `raw` text and
/// nothing is defaulted except a missing `indicators` list.
///
/// # Errors
///
/// - [`ExtractionError::MalformedPayload`] when the candidate span does not
///   parse, or parses to something other than an object.
/// - [`ExtractionError::SchemaViolation`] when a required field is missing or
///   mistyped, or `verdict` is not one of the known literals.
pub fn extract_analysis(
    raw: &str,
    grounding: &[GroundingReference],
) -> Result<AnalysisResult, ExtractionError> {
    let candidate = extract_json_candidate(raw);

    let value: Value = serde_json::from_str(&candidate)
        .map_err(|e| ExtractionError::malformed(format!("invalid JSON: {}", e), raw))?;

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(ExtractionError::malformed(
                format!("expected a JSON object, found {}", json_type_name(&other)),
                raw,
            ))
        }
    };

    let is_ai_generated = required(&object, "isAiGenerated", raw)?
        .as_bool()
        .ok_or_else(|| ExtractionError::schema("isAiGenerated", "expected a boolean", raw))?;

    let confidence_score = integer_score(required(&object, "confidenceScore", raw)?)
        .ok_or_else(|| ExtractionError::schema("confidenceScore", "expected a number", raw))?;

    let verdict = required(&object, "verdict", raw)?
        .as_str()
        .ok_or_else(|| ExtractionError::schema("verdict", "expected a string", raw))?
        .parse::<Verdict>()
        .map_err(|reason| ExtractionError::schema("verdict", reason, raw))?;

    let reasoning = required(&object, "reasoning", raw)?
        .as_str()
        .ok_or_else(|| ExtractionError::schema("reasoning", "expected a string", raw))?
        .to_string();

    let indicators = string_list(object.get("indicators"))
        .map_err(|reason| ExtractionError::schema("indicators", reason, raw))?;

    tracing::debug!(
        verdict = %verdict,
        confidence_score,
        indicators = indicators.len(),
        "Extracted analysis result from model reply"
    );

    Ok(AnalysisResult {
        is_ai_generated,
        confidence_score,
        verdict,
        reasoning,
        indicators,
        grounding: collect_sources(grounding),
    })
}

/// Looks up a field that must be present; `null` counts as missing.
fn required<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    raw: &str,
) -> Result<&'a Value, ExtractionError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ExtractionError::schema(
            field,
            "missing required field",
            raw,
        )),
        Some(value) => Ok(value),
    }
}

/// Accepts any finite JSON number, rounding fractional scores.
fn integer_score(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.round() as i64)
    })
}

fn string_list(value: Option<&Value>) -> Result<Vec<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| format!("element {} is not a string", i))
            })
            .collect(),
        Some(other) => Err(format!(
            "expected an array of strings, found {}",
            json_type_name(other)
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
