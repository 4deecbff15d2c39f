//! Request body validation for the sentiment endpoints
//!
//! Length limits count Unicode scalar values, so a limit of N accepts exactly
//! N characters. A single text is measured after trimming surrounding
//! whitespace; batch items are measured as submitted.

use sentiment_core::config::LimitsConfig;
use serde_json::Value;

use crate::ApiError;

fn invalid(message: impl Into<String>) -> ApiError {
    ApiError::Validation(message.into())
}

/// Reject bodies that are not a JSON object or are an empty object
fn require_object(body: &Value) -> Result<&serde_json::Map<String, Value>, ApiError> {
    match body {
        Value::Object(map) if !map.is_empty() => Ok(map),
        _ => Err(invalid("Request body cannot be empty")),
    }
}

/// Validate a single-analysis body `{"text": "..."}` and return the text
pub fn validate_text_input(body: &Value, limits: &LimitsConfig) -> Result<String, ApiError> {
    let map = require_object(body)?;

    let text = match map.get("text") {
        None => return Err(invalid("Missing 'text' field in request body")),
        Some(Value::String(text)) => text,
        Some(_) => return Err(invalid("'text' must be a string")),
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(invalid("Text field cannot be empty"));
    }

    if trimmed.chars().count() > limits.max_text_length {
        return Err(invalid(format!(
            "Text too long. Maximum {} characters allowed",
            limits.max_text_length
        )));
    }

    Ok(text.clone())
}

/// Validate a batch body `{"texts": [...]}` and return the texts in order.
///
/// The whole batch is rejected if any item is invalid; the message names the
/// first offending index.
pub fn validate_batch_input(body: &Value, limits: &LimitsConfig) -> Result<Vec<String>, ApiError> {
    let map = require_object(body)?;

    let items = match map.get("texts") {
        None => return Err(invalid("Missing 'texts' field in request body")),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid("'texts' must be a list")),
    };

    if items.is_empty() {
        return Err(invalid("Texts list cannot be empty"));
    }

    if items.len() > limits.max_batch_size {
        return Err(invalid(format!(
            "Too many texts. Maximum {} texts allowed per batch",
            limits.max_batch_size
        )));
    }

    let mut texts = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let text = item
            .as_str()
            .ok_or_else(|| invalid(format!("Text at index {} must be a string", index)))?;

        if text.trim().is_empty() {
            return Err(invalid(format!("Text at index {} cannot be empty", index)));
        }

        if text.chars().count() > limits.max_text_length {
            return Err(invalid(format!(
                "Text at index {} too long. Maximum {} characters allowed",
                index, limits.max_text_length
            )));
        }

        texts.push(text.to_string());
    }

    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(err: ApiError) -> String {
        match err {
            ApiError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    fn limits() -> LimitsConfig {
        LimitsConfig {
            max_text_length: 10,
            max_batch_size: 3,
        }
    }

    #[test]
    fn test_valid_text() {
        let text = validate_text_input(&json!({"text": "  Great  "}), &limits()).unwrap();
        assert_eq!(text, "  Great  ");
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(
            message(validate_text_input(&json!({}), &limits()).unwrap_err()),
            "Request body cannot be empty"
        );
        assert_eq!(
            message(validate_text_input(&json!(null), &limits()).unwrap_err()),
            "Request body cannot be empty"
        );
    }

    #[test]
    fn test_text_field_checks() {
        let l = limits();
        assert_eq!(
            message(validate_text_input(&json!({"review": "x"}), &l).unwrap_err()),
            "Missing 'text' field in request body"
        );
        assert_eq!(
            message(validate_text_input(&json!({"text": 42}), &l).unwrap_err()),
            "'text' must be a string"
        );
        assert_eq!(
            message(validate_text_input(&json!({"text": " \n\t "}), &l).unwrap_err()),
            "Text field cannot be empty"
        );
        assert_eq!(
            message(validate_text_input(&json!({"text": "a".repeat(11)}), &l).unwrap_err()),
            "Text too long. Maximum 10 characters allowed"
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // Ten two-byte characters fit a limit of ten
        let text = "é".repeat(10);
        assert!(validate_text_input(&json!({ "text": text }), &limits()).is_ok());
    }

    #[test]
    fn test_single_text_length_ignores_surrounding_whitespace() {
        let padded = format!("   {}   ", "a".repeat(10));
        let text = validate_text_input(&json!({ "text": padded.clone() }), &limits()).unwrap();
        assert_eq!(text, padded);

        // Batch items are measured as submitted
        let err = validate_batch_input(&json!({ "texts": [padded] }), &limits()).unwrap_err();
        assert_eq!(
            message(err),
            "Text at index 0 too long. Maximum 10 characters allowed"
        );
    }

    #[test]
    fn test_valid_batch() {
        let texts = validate_batch_input(&json!({"texts": ["a", "b"]}), &limits()).unwrap();
        assert_eq!(texts, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_batch_checks() {
        let l = limits();
        assert_eq!(
            message(validate_batch_input(&json!({"text": "a"}), &l).unwrap_err()),
            "Missing 'texts' field in request body"
        );
        assert_eq!(
            message(validate_batch_input(&json!({"texts": "a"}), &l).unwrap_err()),
            "'texts' must be a list"
        );
        assert_eq!(
            message(validate_batch_input(&json!({"texts": []}), &l).unwrap_err()),
            "Texts list cannot be empty"
        );
        assert_eq!(
            message(validate_batch_input(&json!({"texts": ["a", "b", "c", "d"]}), &l).unwrap_err()),
            "Too many texts. Maximum 3 texts allowed per batch"
        );
    }

    #[test]
    fn test_batch_item_checks_name_index() {
        let l = limits();
        assert_eq!(
            message(validate_batch_input(&json!({"texts": ["ok", 7]}), &l).unwrap_err()),
            "Text at index 1 must be a string"
        );
        assert_eq!(
            message(validate_batch_input(&json!({"texts": ["ok", "fine", "  "]}), &l).unwrap_err()),
            "Text at index 2 cannot be empty"
        );
        assert_eq!(
            message(validate_batch_input(&json!({"texts": ["a".repeat(11)]}), &l).unwrap_err()),
            "Text at index 0 too long. Maximum 10 characters allowed"
        );
    }

    #[test]
    fn test_batch_at_limit_accepted() {
        let l = limits();
        let texts = validate_batch_input(&json!({"texts": ["a", "b", "c"]}), &l).unwrap();
        assert_eq!(texts.len(), 3);
    }
}
