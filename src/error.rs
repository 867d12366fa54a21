//! Error taxonomy for API calls.

use serde_json::Value;
use thiserror::Error;

use crate::api::transport::TransportError;

/// Failure of a single logical API call, including its possible retry.
///
/// Variants carrying `data` hold the server's JSON error payload, or a
/// generic `{"message": ...}` object when the body was not JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 outside the login endpoint after refresh was exhausted. The session
    /// has already been cleared and an expiry event emitted.
    #[error("Unauthorized ({status}): {}", payload_message(.data))]
    Unauthorized { status: u16, data: Value },

    /// 401 from the login endpoint. No session side effects.
    #[error("Login rejected: {}", payload_message(.data))]
    LoginRejected { data: Value },

    /// Any other non-2xx response.
    #[error("Request failed ({status}): {}", payload_message(.data))]
    Http { status: u16, data: Value },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Failed to encode request: {0}")]
    Encode(String),
}

impl ApiError {
    /// HTTP status of the failed response, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. } | ApiError::Http { status, .. } => Some(*status),
            ApiError::LoginRejected { .. } => Some(401),
            _ => None,
        }
    }

    /// Server error payload, if the server answered.
    pub fn data(&self) -> Option<&Value> {
        match self {
            ApiError::Unauthorized { data, .. }
            | ApiError::LoginRejected { data }
            | ApiError::Http { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Generic payload used when an error body is not parseable JSON.
pub fn fallback_payload(status: u16) -> Value {
    serde_json::json!({ "message": format!("Request failed with status {}", status) })
}

fn payload_message(data: &Value) -> String {
    match data.get("message").or_else(|| data.get("error")) {
        Some(Value::String(msg)) => msg.clone(),
        _ => data.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_uses_server_message() {
        let err = ApiError::Http {
            status: 422,
            data: json!({"message": "Email already taken"}),
        };
        assert_eq!(err.to_string(), "Request failed (422): Email already taken");
    }

    #[test]
    fn test_display_falls_back_to_raw_payload() {
        let err = ApiError::LoginRejected {
            data: json!({"code": 7}),
        };
        assert_eq!(err.to_string(), "Login rejected: {\"code\":7}");
    }

    #[test]
    fn test_status_and_data_accessors() {
        let err = ApiError::LoginRejected { data: json!({}) };
        assert_eq!(err.status(), Some(401));
        assert!(err.data().is_some());

        let err = ApiError::Decode("bad".to_string());
        assert_eq!(err.status(), None);
        assert!(err.data().is_none());
    }

    #[test]
    fn test_fallback_payload() {
        assert_eq!(
            fallback_payload(503),
            json!({"message": "Request failed with status 503"})
        );
    }
}
