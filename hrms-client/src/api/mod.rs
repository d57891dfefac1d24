//! Typed service wrappers for the HRMS endpoints
//!
//! Reads go through the [`QueryClient`] under the keys in [`keys`]; writes
//! are mutations that invalidate the keys they affect once the server has
//! accepted them.

mod admin;
mod auth;
mod employee;
pub mod keys;
mod manager;
mod payroll;
mod timesheet;

use std::sync::Arc;

use serde::de::DeserializeOwned;

pub use admin::{AdminEmployeeService, AdminPayrollService};
pub use auth::{AuthService, LoginOutcome};
pub use employee::EmployeeService;
pub use manager::ManagerService;
pub use payroll::PayrollService;
pub use timesheet::TimesheetService;

use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::query::{QueryClient, QueryKey, QueryOptions};

/// Handles every service needs
#[derive(Clone)]
pub struct ServiceContext {
    pub(crate) api: Arc<ApiClient>,
    pub(crate) queries: Arc<QueryClient>,
}

impl ServiceContext {
    pub fn new(api: Arc<ApiClient>, queries: Arc<QueryClient>) -> Self {
        Self { api, queries }
    }

    /// Cached GET
    pub(crate) async fn query<T>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        path: String,
        params: Vec<(&'static str, String)>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let api = self.api.clone();
        self.queries
            .fetch(key, options, move || {
                let api = api.clone();
                let path = path.clone();
                let params = params.clone();
                async move { api.get_with_query(&path, &params).await }
            })
            .await
    }
}
