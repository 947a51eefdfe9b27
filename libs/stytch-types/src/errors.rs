use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Structured error reported by the Stytch API for any status >= 400.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{status_code} {error_type}: {error_message}")]
pub struct ApiError {
    pub status_code: u16,
    pub request_id: String,
    pub error_type: String,
    pub error_message: String,
    pub error_url: String,
}

impl ApiError {
    /// Reads an error body without validating it.
    ///
    /// Missing or mistyped string fields become empty; a missing or
    /// non-numeric `status_code` falls back to `http_status`.
    pub fn from_json(body: &Value, http_status: u16) -> Self {
        let text = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let status_code = body
            .get("status_code")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(http_status);

        Self {
            status_code,
            request_id: text("request_id"),
            error_type: text("error_type"),
            error_message: text("error_message"),
            error_url: text("error_url"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_full_body() {
        let error = ApiError::from_json(
            &json!({
                "status_code": 400,
                "request_id": "request-id-test-1",
                "error_type": "invalid_email",
                "error_message": "Email format is invalid.",
                "error_url": "https://stytch.com/docs/api/errors/400"
            }),
            400,
        );

        assert_eq!(error.status_code, 400);
        assert_eq!(error.error_type, "invalid_email");
        assert_eq!(error.request_id, "request-id-test-1");
        assert_eq!(error.to_string(), "400 invalid_email: Email format is invalid.");
    }

    #[test]
    fn test_from_json_missing_fields() {
        let error = ApiError::from_json(&json!({"error_type": "too_many_requests"}), 429);

        assert_eq!(error.status_code, 429);
        assert_eq!(error.error_type, "too_many_requests");
        assert_eq!(error.request_id, "");
        assert_eq!(error.error_url, "");
    }

    #[test]
    fn test_from_json_non_object_body() {
        let error = ApiError::from_json(&json!(["unexpected"]), 502);

        assert_eq!(error.status_code, 502);
        assert_eq!(error.error_type, "");
    }
}
