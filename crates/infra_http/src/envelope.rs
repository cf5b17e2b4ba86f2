//! Response envelope handling
//!
//! The backend answers with bare JSON objects, but some routes wrap the
//! payload as `{"success": true, "data": {...}}`. Error bodies carry the
//! reason in `detail`, `message` or `error`; `detail` may also be a list of
//! field errors.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Decodes a successful response body into JSON
///
/// An empty body decodes to `null`. A `{success, data}` wrapper is removed.
pub fn decode_body(body: &[u8]) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::invalid_response(format!("body is not JSON: {}", e)))?;
    Ok(unwrap_data(value))
}

fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("success") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Extracts the human-readable reason from an error body
pub fn error_message(status: u16, body: &[u8]) -> String {
    let fallback = || {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() || text.len() > 300 {
            format!("Request failed with status {}", status)
        } else {
            text
        }
    };

    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return fallback();
    };

    for key in ["detail", "message", "error"] {
        match value.get(key) {
            Some(Value::String(message)) if !message.is_empty() => return message.clone(),
            Some(Value::Array(items)) if !items.is_empty() => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item.get("msg").and_then(Value::as_str) {
                        Some(msg) => msg.to_string(),
                        None => item.to_string(),
                    })
                    .collect();
                return parts.join("; ");
            }
            _ => {}
        }
    }
    fallback()
}

/// Deserializes a decoded body into a typed response
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::invalid_response(e.to_string()))
}

/// Renders a JSON identifier (string or number) as a string
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_is_null() {
        assert_eq!(decode_body(b"").unwrap(), Value::Null);
        assert_eq!(decode_body(b"  \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_data_wrapper_removed() {
        let body = br#"{"success": true, "data": {"total_photos": 2}}"#;
        assert_eq!(decode_body(body).unwrap(), json!({"total_photos": 2}));
    }

    #[test]
    fn test_plain_object_kept() {
        let body = br#"{"success": true, "claim_json": "{}"}"#;
        assert_eq!(
            decode_body(body).unwrap(),
            json!({"success": true, "claim_json": "{}"})
        );
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = decode_body(b"<html>").unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_error_message_detail_string() {
        let body = br#"{"detail": "Claim window closed"}"#;
        assert_eq!(error_message(400, body), "Claim window closed");
    }

    #[test]
    fn test_error_message_detail_list() {
        let body = br#"{"detail": [{"loc": ["body", "loss_type"], "msg": "field required"}]}"#;
        assert_eq!(error_message(422, body), "field required");
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(error_message(404, b""), "Request failed with status 404");
        assert_eq!(error_message(400, b"bad survey"), "bad survey");
    }

    #[test]
    fn test_id_string() {
        assert_eq!(id_string(&json!(17)), Some("17".to_string()));
        assert_eq!(id_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(id_string(&json!(null)), None);
    }
}
