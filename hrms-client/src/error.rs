//! Client error types

use std::collections::HashMap;

use reqwest::StatusCode;
use shared::ErrorResponse;
use thiserror::Error;

/// Client error type
///
/// `Clone` so a single in-flight result can be handed to every caller
/// waiting on the same query key.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Transport failure (connection refused, DNS, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// 401 on an authenticated request
    #[error("Authentication required: {message}")]
    Unauthorized { message: String },

    /// 403 on an authenticated request
    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    /// Login rejected the credentials (401 or 403)
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { status: u16, message: String },

    /// 400/409/422, with per-field messages when the server sent them
    #[error("Validation error: {message}")]
    Validation {
        status: u16,
        message: String,
        field_errors: HashMap<String, String>,
    },

    /// 404
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// 5xx, 408 and 429
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client misconfiguration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation not valid in the current session state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error classes the retry policy and session handling act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401/403: never retried, ends the session
    Authorization,
    /// Bad input: never retried, no session impact
    Validation,
    /// Missing resource
    NotFound,
    /// Network, timeout, 5xx: retried with backoff
    Transient,
    /// Decode, configuration and state errors raised on this side
    Local,
}

impl ClientError {
    /// Build an error from a non-success status and its raw body
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|e| e.best_message())
            .map(str::to_string)
            .unwrap_or_else(|| fallback_message(status).to_string());
        let code = status.as_u16();

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized { message },
            StatusCode::FORBIDDEN => Self::Forbidden { message },
            StatusCode::NOT_FOUND => Self::NotFound { message },
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation {
                    status: code,
                    message,
                    field_errors: parsed
                        .and_then(|e| e.validation_errors)
                        .unwrap_or_default(),
                }
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                Self::Server { status: code, message }
            }
            s if s.is_server_error() => Self::Server { status: code, message },
            _ => Self::Http { status: code, message },
        }
    }

    /// Classification used by retry and session handling
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } | Self::Forbidden { .. } | Self::InvalidCredentials { .. } => {
                ErrorKind::Authorization
            }
            Self::Validation { .. } | Self::Http { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Network(_) | Self::Timeout | Self::Server { .. } => ErrorKind::Transient,
            Self::InvalidResponse(_) | Self::Config(_) | Self::InvalidState(_) => ErrorKind::Local,
        }
    }

    /// HTTP status, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::InvalidCredentials { status, .. }
            | Self::Validation { status, .. }
            | Self::Server { status, .. }
            | Self::Http { status, .. } => Some(*status),
            Self::Network(_)
            | Self::Timeout
            | Self::InvalidResponse(_)
            | Self::Config(_)
            | Self::InvalidState(_) => None,
        }
    }

    /// Human-readable message, server-supplied when one was sent
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::InvalidCredentials { message, .. }
            | Self::NotFound { message }
            | Self::Validation { message, .. }
            | Self::Server { message, .. }
            | Self::Http { message, .. } => message.clone(),
            Self::Timeout => "The server took too long to respond".to_string(),
            Self::Network(_) => "Unable to reach the server".to_string(),
            other => other.to_string(),
        }
    }

    /// Per-field messages of a validation failure
    pub fn validation_errors(&self) -> Option<&HashMap<String, String>> {
        match self {
            Self::Validation { field_errors, .. } if !field_errors.is_empty() => Some(field_errors),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

fn fallback_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "Authentication required",
        StatusCode::FORBIDDEN => "Permission denied",
        StatusCode::NOT_FOUND => "Resource not found",
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => "Invalid request",
        StatusCode::CONFLICT => "Resource already exists",
        s if s.is_server_error() => "Server error, please try again",
        _ => "Request failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_body_maps_field_errors() {
        let body = r#"{
            "status": 400,
            "error": "Validation Failed",
            "message": "Input validation failed",
            "validationErrors": {"email": "must be a well-formed email address"}
        }"#;
        let err = ClientError::from_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.message(), "Input validation failed");
        assert_eq!(
            err.validation_errors().unwrap().get("email").unwrap(),
            "must be a well-formed email address"
        );
    }

    #[test]
    fn test_auth_statuses_are_authorization_failures() {
        let unauthorized = ClientError::from_response(StatusCode::UNAUTHORIZED, "");
        assert!(unauthorized.is_auth_failure());
        assert_eq!(unauthorized.message(), "Authentication required");

        let forbidden =
            ClientError::from_response(StatusCode::FORBIDDEN, r#"{"message":"Access denied"}"#);
        assert!(forbidden.is_auth_failure());
        assert_eq!(forbidden.status(), Some(403));
        assert_eq!(forbidden.message(), "Access denied");
    }

    #[test]
    fn test_server_errors_are_transient() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::TOO_MANY_REQUESTS,
        ] {
            let err = ClientError::from_response(status, "<html>oops</html>");
            assert!(err.is_transient(), "{status} should be transient");
        }
        assert!(ClientError::Timeout.is_transient());
        assert!(ClientError::Network("connection refused".into()).is_transient());
    }

    #[test]
    fn test_fallback_messages() {
        let err = ClientError::from_response(StatusCode::NOT_FOUND, "not json");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "Resource not found");
        assert!(err.validation_errors().is_none());

        let err = ClientError::from_response(StatusCode::IM_A_TEAPOT, "");
        assert_eq!(err.status(), Some(418));
        assert_eq!(err.message(), "Request failed");
    }

    #[test]
    fn test_local_errors() {
        let err: ClientError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Local);
        assert_eq!(err.status(), None);
        assert_eq!(
            ClientError::InvalidState("no session".into()).kind(),
            ErrorKind::Local
        );
    }
}
