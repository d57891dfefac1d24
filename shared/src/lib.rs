//! Shared types for the HRMS client
//!
//! Wire types exchanged with the HRMS backend: auth payloads, employee,
//! timesheet and payroll models, pagination and error envelopes.

pub mod client;
pub mod error;
pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use client::{
    AuthResponse, EmployeeAuthInfo, LoginRequest, LogoutRequest, RefreshTokenRequest,
    RefreshTokenResponse, ResetPasswordRequest,
};
pub use error::ErrorResponse;
pub use models::role::{Role, RoleSet};
pub use response::{MessageResponse, PageResponse, SortDirection};
