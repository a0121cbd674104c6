//! Tolerant parsing of reasoning-endpoint replies.
//!
//! Two steps: [`extract_candidate_json`] cuts the outermost `{ ... }` span out
//! of surrounding prose, then [`repair_and_parse`] strips trailing commas and
//! reads each field leniently. [`parse_response`] chains them and falls back
//! to the default classification on any failure.

use crate::{AdType, Classification};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

/// A comma directly before a closing bracket or brace
static RE_TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").expect("valid trailing comma regex"));

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in response")]
    NoJson,

    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// The span from the first `{` to the last `}`, if both exist in that order
#[must_use]
pub fn extract_candidate_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Remove commas that immediately precede `]` or `}`
#[must_use]
pub fn repair_trailing_commas(json: &str) -> String {
    RE_TRAILING_COMMA.replace_all(json, "$1").into_owned()
}

/// Repair and parse a candidate object into a classification.
///
/// Missing or mistyped fields take their defaults rather than failing.
pub fn repair_and_parse(candidate: &str) -> Result<Classification, ParseError> {
    let repaired = repair_trailing_commas(candidate);
    let fields = match serde_json::from_str(&repaired)? {
        Value::Object(fields) => fields,
        other => return Err(ParseError::NotAnObject(json_kind(&other))),
    };

    Ok(Classification {
        is_ad: bool_field(&fields, "is_ad"),
        ad_type: fields
            .get("ad_type")
            .and_then(Value::as_str)
            .map_or(AdType::None, AdType::from_label),
        product_name: text_field(&fields, "product_name", "、"),
        ad_text: text_field(&fields, "ad_text", "。"),
        confidence: number_field(&fields, "confidence"),
        timestamp: text_field(&fields, "timestamp", "; "),
        raw_response: String::new(),
    })
}

/// Extract, repair and parse a raw reply without falling back
pub fn try_parse_response(raw: &str) -> Result<Classification, ParseError> {
    let candidate = extract_candidate_json(raw).ok_or(ParseError::NoJson)?;
    let mut classification = repair_and_parse(candidate)?;
    classification.raw_response = raw.to_string();
    Ok(classification)
}

/// Parse a raw reply, falling back to the default classification
#[must_use]
pub fn parse_response(raw: &str) -> Classification {
    match try_parse_response(raw) {
        Ok(classification) => classification,
        Err(ParseError::NoJson) => {
            debug!("No JSON object in response, using default classification");
            Classification::default_for(raw)
        }
        Err(e) => {
            warn!("Failed to parse response ({}), using default classification", e);
            Classification::default_for(raw)
        }
    }
}

fn bool_field(fields: &Map<String, Value>, key: &str) -> bool {
    match fields.get(key) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "是"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

fn number_field(fields: &Map<String, Value>, key: &str) -> f64 {
    match fields.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Strings pass through, lists are joined with `separator`, numbers are printed
fn text_field(fields: &Map<String, Value>, key: &str, separator: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(separator),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_comma_repair() {
        let raw = r#"{"is_ad":true,"ad_type":"软广","product_name":"X","ad_text":"Y","confidence":0.9,}"#;
        let parsed = parse_response(raw);
        assert!(parsed.is_ad);
        assert_eq!(parsed.ad_type, AdType::Soft);
        assert_eq!(parsed.product_name, "X");
        assert_eq!(parsed.ad_text, "Y");
        assert!((parsed.confidence - 0.9).abs() < f64::EPSILON);
        assert_eq!(parsed.raw_response, raw);
    }

    #[test]
    fn test_no_json_falls_back_to_default() {
        let parsed = parse_response("I cannot answer that.");
        assert_eq!(parsed, Classification::default_for("I cannot answer that."));
        assert!(!parsed.is_ad);
        assert_eq!(parsed.confidence, 0.0);
    }

    #[test]
    fn test_surrounding_prose_is_ignored() {
        let raw = "分析结果如下：\n```json\n{\"is_ad\": true, \"ad_type\": \"硬广\", \"product_name\": [\"水杯\", \"耳机\",], \"confidence\": 0.85}\n```\n希望有帮助";
        let parsed = parse_response(raw);
        assert!(parsed.is_ad);
        assert_eq!(parsed.ad_type, AdType::Hard);
        assert_eq!(parsed.product_name, "水杯、耳机");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let parsed = repair_and_parse(r#"{"is_ad": true}"#).unwrap();
        assert!(parsed.is_ad);
        assert_eq!(parsed.ad_type, AdType::None);
        assert_eq!(parsed.product_name, "");
        assert_eq!(parsed.ad_text, "");
        assert_eq!(parsed.confidence, 0.0);
        assert_eq!(parsed.timestamp, "");
    }

    #[test]
    fn test_lenient_field_types() {
        let parsed =
            repair_and_parse(r#"{"is_ad": "true", "confidence": "0.7", "product_name": null}"#).unwrap();
        assert!(parsed.is_ad);
        assert!((parsed.confidence - 0.7).abs() < f64::EPSILON);
        assert_eq!(parsed.product_name, "");
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(matches!(
            repair_and_parse("[1, 2,]"),
            Err(ParseError::NotAnObject("array"))
        ));
        assert!(matches!(
            try_parse_response(r#"reply: {"a": 1} and {oops}"#),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(try_parse_response("nothing here"), Err(ParseError::NoJson)));
    }

    #[test]
    fn test_out_of_range_confidence_is_kept() {
        let parsed = repair_and_parse(r#"{"is_ad": true, "confidence": 1.5}"#).unwrap();
        assert!((parsed.confidence - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_object_falls_back() {
        let raw = r#"{"is_ad": true, "ad_type": 软广}"#;
        assert!(matches!(
            repair_and_parse(extract_candidate_json(raw).unwrap()),
            Err(ParseError::Malformed(_))
        ));
        assert_eq!(parse_response(raw), Classification::default_for(raw));
    }

    #[test]
    fn test_candidate_extraction_bounds() {
        assert_eq!(extract_candidate_json("a {\"x\": {\"y\": 1}} b"), Some("{\"x\": {\"y\": 1}}"));
        assert_eq!(extract_candidate_json("} then {"), None);
        assert_eq!(extract_candidate_json("no braces"), None);
    }

    #[test]
    fn test_repair_handles_whitespace_before_closer() {
        assert_eq!(repair_trailing_commas("[1, 2,\n ]"), "[1, 2]");
        assert_eq!(repair_trailing_commas("{\"a\": 1 ,  }"), "{\"a\": 1 }");
    }
}
