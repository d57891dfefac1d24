//! Error body returned by the HRMS backend
//!
//! Every non-2xx response from the backend carries this shape. Validation
//! failures additionally fill `validation_errors` with one message per field.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backend error response
///
/// ```json
/// {
///     "timestamp": "2025-01-06T10:15:30",
///     "status": 400,
///     "error": "Validation Failed",
///     "message": "Input validation failed",
///     "path": "/api/employee/contact-info",
///     "validationErrors": { "phoneNumber": "must be a valid phone number" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, String>>,
}

impl ErrorResponse {
    /// The most specific human-readable message the body carries
    pub fn best_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| self.error.as_deref().filter(|e| !e.trim().is_empty()))
    }

    /// True when the server reported per-field errors
    pub fn has_field_errors(&self) -> bool {
        self.validation_errors
            .as_ref()
            .is_some_and(|errors| !errors.is_empty())
    }
}
