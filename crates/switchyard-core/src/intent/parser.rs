//! Classifier response parsing
//!
//! Model output often wraps the requested JSON in prose or code fences, so
//! the parser extracts the first balanced `{...}` object before decoding it.

use super::table::Intent;
use super::{ClassificationSource, ClassifiedIntent};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Confidence used when the model omits it
pub const DEFAULT_SEMANTIC_CONFIDENCE: f32 = 0.8;

/// Classifier response parse failures
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    /// No balanced JSON object in the text
    #[error("no JSON object found in classifier response")]
    NoJsonObject,

    /// The extracted object is not valid JSON of the expected shape
    #[error("invalid classifier JSON: {0}")]
    InvalidJson(String),

    /// The intent key is not in the intent table
    #[error("unknown intent '{0}'")]
    UnknownIntent(String),
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    intent: String,
    #[serde(default)]
    confidence: Option<Value>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Return the first balanced `{...}` substring of `text`
///
/// Braces inside JSON string literals (including escaped quotes) are not
/// counted. Returns `None` when no opening brace is ever closed.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<&str> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| balanced_end(&text[start..]).map(|end| &text[start..start + end]))
}

/// Byte length of the balanced object starting at `text[0] == '{'`
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

fn confidence_from(value: Option<Value>) -> f32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0) as f32,
        _ => DEFAULT_SEMANTIC_CONFIDENCE,
    }
}

/// Parse a model response into a classified intent
///
/// # Errors
///
/// Fails when no JSON object can be extracted, the object does not decode,
/// or the intent key is unknown.
pub fn parse_classification(text: &str) -> Result<ClassifiedIntent, ParseError> {
    let json = extract_json_object(text).ok_or(ParseError::NoJsonObject)?;
    let raw: RawClassification =
        serde_json::from_str(json).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let intent = Intent::from_key(&raw.intent).ok_or(ParseError::UnknownIntent(raw.intent))?;

    Ok(ClassifiedIntent::new(
        intent,
        confidence_from(raw.confidence),
        raw.reasoning.unwrap_or_default(),
        ClassificationSource::Semantic,
    ))
}
