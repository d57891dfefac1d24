//! Auth API DTOs
//!
//! Request/response types for the `/auth/*` endpoints. Credentials and
//! tokens are redacted from `Debug` output so they never reach the logs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::role::Role;

const REDACTED: &str = "[redacted]";

/// Login request
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

/// Login response data
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Access token lifetime in milliseconds
    #[serde(default)]
    pub expires_in: i64,
    pub employee: EmployeeAuthInfo,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &REDACTED)
            .field("refresh_token", &REDACTED)
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("employee", &self.employee)
            .finish()
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Profile of the authenticated employee, persisted under the `user` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeAuthInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_first_login: bool,
}

impl EmployeeAuthInfo {
    /// "First Last", used for greetings and log lines
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Refresh token request
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

impl fmt::Debug for RefreshTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRequest")
            .field("refresh_token", &REDACTED)
            .finish()
    }
}

/// Refresh token response. The server may or may not rotate the refresh token.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
}

impl fmt::Debug for RefreshTokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenResponse")
            .field("access_token", &REDACTED)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTED))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Logout request
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

impl fmt::Debug for LogoutRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogoutRequest")
            .field("refresh_token", &REDACTED)
            .finish()
    }
}

/// Password reset request
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPasswordRequest").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_deserialize() {
        let json = r#"{
            "accessToken": "a.b.c",
            "refreshToken": "r-1",
            "tokenType": "Bearer",
            "expiresIn": 900000,
            "employee": {
                "id": 7,
                "username": "jdoe",
                "email": "jdoe@example.com",
                "firstName": "Jane",
                "lastName": "Doe",
                "role": "MANAGER",
                "isFirstLogin": false
            }
        }"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "a.b.c");
        assert_eq!(resp.employee.role, Role::Manager);
        assert_eq!(resp.employee.display_name(), "Jane Doe");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let req = LoginRequest::new("jdoe", "hunter2");
        let out = format!("{:?}", req);
        assert!(out.contains("jdoe"));
        assert!(!out.contains("hunter2"));

        let refresh = RefreshTokenResponse {
            access_token: "secret-access".into(),
            refresh_token: Some("secret-refresh".into()),
            token_type: "Bearer".into(),
            expires_in: 0,
        };
        let out = format!("{:?}", refresh);
        assert!(!out.contains("secret-access"));
        assert!(!out.contains("secret-refresh"));
    }

    #[test]
    fn test_refresh_response_without_rotation() {
        let json = r#"{"accessToken":"new"}"#;
        let resp: RefreshTokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "new");
        assert!(resp.refresh_token.is_none());
        assert_eq!(resp.token_type, "Bearer");
    }
}
