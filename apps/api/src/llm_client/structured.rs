//! Structured Response Parser: pulls a JSON object out of free-form model output.
//!
//! Models are asked for JSON only but routinely wrap it in prose or code fences.
//! `BalancedObjectParser` scans for brace-delimited spans (string-aware, so braces
//! inside JSON strings do not count) and returns the first span that parses as a
//! JSON object. Whether that object has the expected shape is the caller's problem.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StructuredParseError {
    #[error("response text is empty")]
    Empty,

    #[error("no JSON object found in response")]
    NoObject,

    #[error("JSON object in response is never closed")]
    Unbalanced,

    #[error("no brace-delimited span parsed as a JSON object: {0}")]
    InvalidJson(String),
}

/// Extracts one structured payload from raw generation output.
pub trait StructuredResponseParser: Send + Sync {
    fn extract_object(&self, text: &str) -> Result<Value, StructuredParseError>;
}

/// Finds the first balanced `{...}` span that is a syntactically valid JSON object.
#[derive(Debug, Default, Clone, Copy)]
pub struct BalancedObjectParser;

impl StructuredResponseParser for BalancedObjectParser {
    fn extract_object(&self, text: &str) -> Result<Value, StructuredParseError> {
        if text.trim().is_empty() {
            return Err(StructuredParseError::Empty);
        }

        let bytes = text.as_bytes();
        let mut saw_open = false;
        let mut saw_closed_span = false;
        let mut last_parse_error = None;

        for (start, _) in bytes.iter().enumerate().filter(|(_, b)| **b == b'{') {
            saw_open = true;
            let Some(end) = matching_close(bytes, start) else {
                continue;
            };
            saw_closed_span = true;

            match serde_json::from_str::<Value>(&text[start..=end]) {
                Ok(value @ Value::Object(_)) => return Ok(value),
                Ok(_) => {}
                Err(e) => last_parse_error = Some(e.to_string()),
            }
        }

        if !saw_open {
            Err(StructuredParseError::NoObject)
        } else if !saw_closed_span {
            Err(StructuredParseError::Unbalanced)
        } else {
            Err(StructuredParseError::InvalidJson(
                last_parse_error.unwrap_or_else(|| "not an object".to_string()),
            ))
        }
    }
}

/// Returns the index of the `}` that closes the `{` at `start`, if any.
fn matching_close(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Result<Value, StructuredParseError> {
        BalancedObjectParser.extract_object(text)
    }

    #[test]
    fn test_clean_payload() {
        let value = extract(r#"{"careers": [{"title": "Data Analyst"}]}"#).unwrap();
        assert_eq!(value["careers"][0]["title"], "Data Analyst");
    }

    #[test]
    fn test_prose_around_payload() {
        let text = "Sure! Here are your matches:\n{\"careers\": []}\nGood luck with your journey.";
        let value = extract(text).unwrap();
        assert!(value["careers"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_code_fenced_payload() {
        let text = "```json\n{\"nextSteps\": \"Apply to internships\"}\n```";
        assert_eq!(extract(text).unwrap()["nextSteps"], "Apply to internships");
    }

    #[test]
    fn test_braces_inside_strings_do_not_unbalance() {
        let text = r#"Result: {"focus": "Learn } and { in templates", "month": 1} done"#;
        let value = extract(text).unwrap();
        assert_eq!(value["month"], 1);
        assert_eq!(value["focus"], "Learn } and { in templates");
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let text = r#"{"title": "The \"Full\" Stack", "skills": []}"#;
        assert_eq!(extract(text).unwrap()["title"], "The \"Full\" Stack");
    }

    #[test]
    fn test_skips_non_json_brace_span_before_payload() {
        let text = r#"Use {placeholders} like this: {"careers": [{"title": "UX Designer"}]}"#;
        let value = extract(text).unwrap();
        assert_eq!(value["careers"][0]["title"], "UX Designer");
    }

    #[test]
    fn test_first_complete_object_wins() {
        let text = r#"{"a": 1} and then {"b": 2}"#;
        let value = extract(text).unwrap();
        assert_eq!(value["a"], 1);
        assert!(value.get("b").is_none());
    }

    #[test]
    fn test_nested_objects_return_outermost() {
        let text = r#"x {"outer": {"inner": {"deep": true}}} y"#;
        let value = extract(text).unwrap();
        assert_eq!(value["outer"]["inner"]["deep"], true);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract("").unwrap_err(), StructuredParseError::Empty);
        assert_eq!(extract("   \n ").unwrap_err(), StructuredParseError::Empty);
    }

    #[test]
    fn test_no_object() {
        assert_eq!(
            extract("I'm sorry, I can't help with that.").unwrap_err(),
            StructuredParseError::NoObject
        );
    }

    #[test]
    fn test_truncated_object_is_unbalanced() {
        assert_eq!(
            extract(r#"{"roadmap": [{"month": 1, "title": "Basics""#).unwrap_err(),
            StructuredParseError::Unbalanced
        );
    }

    #[test]
    fn test_balanced_but_invalid_json() {
        let err = extract("{not: valid, json}").unwrap_err();
        assert!(matches!(err, StructuredParseError::InvalidJson(_)));
    }

    #[test]
    fn test_multibyte_text_around_payload() {
        let text = "🎯 Вот ответ: {\"title\": \"Дизайнер\"} 🚀";
        assert_eq!(extract(text).unwrap()["title"], "Дизайнер");
    }
}
