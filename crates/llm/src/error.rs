//! Gemini error type with credential and retry classification

use crate::retry::RetryableError;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("API key missing: set GEMINI_API_KEY (or API_KEY) and try again")]
    MissingApiKey,

    #[error("API key rejected (HTTP {status}): {message}")]
    InvalidCredential { status: u16, message: String },

    #[error("HTTP {status} ({error_type}): {message}")]
    Http {
        status: u16,
        error_type: &'static str,
        message: String,
    },

    #[error("Network error: {message}")]
    Network { message: String, retryable: bool },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("Request blocked by the model: {0}")]
    Blocked(String),

    #[error("Live session error: {0}")]
    Live(String),
}

pub type GeminiResult<T> = Result<T, GeminiError>;

/// Google API error envelope: `{"error": {"code", "message", "status", "details"}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GeminiError {
    /// Classify a non-success HTTP response
    pub fn from_status(status: u16, body: &str) -> Self {
        let (message, api_status) = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => (envelope.error.message, envelope.error.status),
            Err(_) => (body.trim().to_string(), None),
        };
        let message = if message.is_empty() {
            format!("status {status} with empty body")
        } else {
            message
        };

        if is_credential_failure(status, body) {
            return GeminiError::InvalidCredential { status, message };
        }

        let is_quota = body.contains("QUOTA_EXCEEDED")
            || body.contains("RESOURCE_EXHAUSTED")
            || message.to_lowercase().contains("quota");

        let error_type = match status {
            408 => "timeout",
            429 if is_quota => "quota_exceeded",
            429 => "rate_limit",
            503 => "service_unavailable",
            500..=599 => "server_error",
            400 => "bad_request",
            404 => "not_found",
            _ => "unknown",
        };

        tracing::debug!(status, error_type, api_status = ?api_status, "Gemini request failed");

        GeminiError::Http {
            status,
            error_type,
            message,
        }
    }

    pub fn from_reqwest(error: reqwest::Error) -> Self {
        let retryable = error.is_timeout() || error.is_connect();
        GeminiError::Network {
            message: error.to_string(),
            retryable,
        }
    }

    /// Missing or rejected API key; callers should ask for a new key rather
    /// than report a generic failure
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            GeminiError::MissingApiKey | GeminiError::InvalidCredential { .. }
        )
    }
}

fn is_credential_failure(status: u16, body: &str) -> bool {
    let lowered = body.to_lowercase();
    match status {
        401 | 403 => true,
        400 => body.contains("API_KEY_INVALID") || lowered.contains("api key not valid"),
        404 => lowered.contains("entity was not found"),
        _ => false,
    }
}

impl RetryableError for GeminiError {
    fn is_retryable(&self) -> bool {
        match self {
            GeminiError::Http { status, .. } => matches!(status, 408 | 429 | 500..=599),
            GeminiError::Network { retryable, .. } => *retryable,
            _ => false,
        }
    }

    fn error_type(&self) -> String {
        match self {
            GeminiError::MissingApiKey => "missing_api_key".to_string(),
            GeminiError::InvalidCredential { .. } => "unauthorized".to_string(),
            GeminiError::Http { error_type, .. } => error_type.to_string(),
            GeminiError::Network { .. } => "network".to_string(),
            GeminiError::MalformedResponse(_) => "parse_error".to_string(),
            GeminiError::EmptyResponse => "empty_response".to_string(),
            GeminiError::Blocked(_) => "blocked".to_string(),
            GeminiError::Live(_) => "live".to_string(),
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_body_is_credential_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        let err = GeminiError::from_status(400, body);
        assert!(err.is_credential_error());
        assert!(err.to_string().contains("API key not valid"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_entity_not_found_is_credential_error() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;
        assert!(GeminiError::from_status(404, body).is_credential_error());
    }

    #[test]
    fn test_status_classification() {
        let quota = GeminiError::from_status(429, r#"{"error":{"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#);
        assert_eq!(quota.error_type(), "quota_exceeded");
        assert!(quota.is_retryable());

        let server = GeminiError::from_status(500, "oops");
        assert_eq!(server.error_type(), "server_error");
        assert!(server.is_retryable());
        assert!(server.to_string().contains("oops"));

        let bad = GeminiError::from_status(400, r#"{"error":{"message":"Invalid JSON payload"}}"#);
        assert_eq!(bad.error_type(), "bad_request");
        assert!(!bad.is_retryable());
        assert!(!bad.is_credential_error());

        let forbidden = GeminiError::from_status(403, "");
        assert!(forbidden.is_credential_error());
    }

    #[test]
    fn test_missing_key_message() {
        let err = GeminiError::MissingApiKey;
        assert!(err.is_credential_error());
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
