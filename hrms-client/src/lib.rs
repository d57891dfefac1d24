//! HRMS Client - session, route gate and API client for the HRMS backend
//!
//! Owns the login session (tokens and user profile), decides which pages a
//! user may open, and talks to the REST API with request caching and
//! automatic session termination on auth failures.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod logger;
pub mod query;
pub mod routes;
pub mod session;

pub use client::{HrmsClient, HrmsClientBuilder};
pub use config::{ClientConfig, QueryConfig};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use gate::{AuthGate, GateDecision};
pub use http::ApiClient;
pub use query::{QueryClient, QueryKey, QueryOptions, RetryPolicy};
pub use routes::{Access, NavItem, RouteTable};
pub use session::{
    FileStorage, MemoryStorage, SessionEvent, SessionState, SessionStorage, SessionStore,
    UserPatch,
};

// Re-export shared types for convenience
pub use shared::{EmployeeAuthInfo, Role, RoleSet};
