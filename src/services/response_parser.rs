//! Parsing of narrative-service responses into typed step outputs.

use serde_json::Value;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::NarrativeOutput;

/// Strip a surrounding Markdown code fence, with or without a language tag.
///
/// Text that already starts as a JSON object or array is returned as is, so
/// fences inside string values are never mistaken for wrapping markup.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_open = &trimmed[start + 3..];
    // Skip an optional language tag on the opening line.
    let body_start = after_open
        .find('\n')
        .filter(|i| after_open[..*i].trim().chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or(0, |i| i + 1);
    let body = &after_open[body_start..];
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => trimmed,
    }
}

/// Parse `text` as `T`, requiring every top-level field `T` declares.
pub fn parse_output<T: NarrativeOutput>(text: &str) -> DomainResult<T> {
    let json = strip_code_fence(text);
    let value: Value = serde_json::from_str(json)
        .map_err(|e| DomainError::ParseFailure(format!("{} response is not JSON: {e}", T::STEP)))?;

    let Value::Object(map) = &value else {
        return Err(DomainError::ParseFailure(format!(
            "{} response is not a JSON object",
            T::STEP
        )));
    };

    let missing: Vec<&str> = T::REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| map.get(*field).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::ParseFailure(format!(
            "{} response is missing required fields: {}",
            T::STEP,
            missing.join(", ")
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| DomainError::ParseFailure(format!("{} response has wrong shape: {e}", T::STEP)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AptitudeAnalysis, FortuneAnalysis};

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("Here you go:\n```json\n{\"a\":1}\n```\nThanks"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1}  \n"), "{\"a\":1}");
    }

    #[test]
    fn test_fence_inside_json_string_is_kept() {
        let text = r#"{"keywords":["a"],"talents":[],"recommendedFields":["Try `x` or ```code``` blocks"]}"#;
        assert_eq!(strip_code_fence(text), text);

        let parsed: AptitudeAnalysis = parse_output(text).unwrap();
        assert_eq!(parsed.recommended_fields, vec!["Try `x` or ```code``` blocks"]);
    }

    #[test]
    fn test_parse_output_accepts_fenced_json() {
        let text = "```json\n{\"keywords\":[\"a\"],\"talents\":[],\"recommendedFields\":[\"x\"]}\n```";
        let parsed: AptitudeAnalysis = parse_output(text).unwrap();
        assert_eq!(parsed.keywords, vec!["a"]);
        assert!(parsed.avoid_fields.is_empty());
    }

    #[test]
    fn test_missing_required_field_is_parse_failure() {
        let err = parse_output::<FortuneAnalysis>("{\"wealth\": {}}").unwrap_err();
        match err {
            DomainError::ParseFailure(message) => assert!(message.contains("love")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_null_field_counts_as_missing() {
        let err = parse_output::<FortuneAnalysis>("{\"wealth\": {}, \"love\": null}").unwrap_err();
        assert!(matches!(err, DomainError::ParseFailure(_)));
    }

    #[test]
    fn test_non_json_is_parse_failure() {
        let err = parse_output::<FortuneAnalysis>("I cannot help with that").unwrap_err();
        assert!(matches!(err, DomainError::ParseFailure(_)));
        assert!(!err.is_retryable());
    }
}
