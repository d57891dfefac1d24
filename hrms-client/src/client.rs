//! HRMS client facade
//!
//! Wires one [`SessionStore`] into the API client, the gate and every
//! service.
//!
//! # Example
//!
//! ```no_run
//! use hrms_client::{ClientConfig, HrmsClient};
//!
//! # async fn run() -> hrms_client::ClientResult<()> {
//! let client = HrmsClient::builder()
//!     .config(ClientConfig::from_env())
//!     .build()?;
//! client.initialize();
//!
//! let outcome = client.auth().login("jdoe", "secret").await?;
//! println!("next page: {}", outcome.redirect_to);
//! let dashboard = client.employee().dashboard().await?;
//! # let _ = dashboard;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::api::{
    AdminEmployeeService, AdminPayrollService, AuthService, EmployeeService, ManagerService,
    PayrollService, ServiceContext, TimesheetService,
};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::gate::AuthGate;
use crate::http::ApiClient;
use crate::query::QueryClient;
use crate::routes::RouteTable;
use crate::session::{FileStorage, SessionEvent, SessionState, SessionStorage, SessionStore};

pub struct HrmsClient {
    config: ClientConfig,
    session: Arc<SessionStore>,
    api: Arc<ApiClient>,
    queries: Arc<QueryClient>,
    gate: AuthGate,
    auth: AuthService,
    employee: EmployeeService,
    timesheets: TimesheetService,
    payroll: PayrollService,
    manager: ManagerService,
    admin_employees: AdminEmployeeService,
    admin_payroll: AdminPayrollService,
}

impl HrmsClient {
    pub fn builder() -> HrmsClientBuilder {
        HrmsClientBuilder::new()
    }

    /// Client with file-backed session storage at `config.session_file`
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        Self::builder().config(config).build()
    }

    /// Restore the persisted session. Call once at startup.
    pub fn initialize(&self) -> SessionState {
        self.session.initialize()
    }

    /// Clear cached queries whenever the session ends
    ///
    /// Rejections seen by the API client and `auth().logout()` already clear
    /// the cache; this also covers `session().logout()`/`expire()` called
    /// directly. Must be called inside a tokio runtime.
    pub fn watch_session(&self) -> JoinHandle<()> {
        let mut events = self.session.subscribe();
        let queries = self.queries.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::LoggedOut | SessionEvent::Expired) => queries.clear(),
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session watcher lagged, clearing cache");
                        queries.clear();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn queries(&self) -> &Arc<QueryClient> {
        &self.queries
    }

    pub fn gate(&self) -> &AuthGate {
        &self.gate
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn employee(&self) -> &EmployeeService {
        &self.employee
    }

    pub fn timesheets(&self) -> &TimesheetService {
        &self.timesheets
    }

    pub fn payroll(&self) -> &PayrollService {
        &self.payroll
    }

    pub fn manager(&self) -> &ManagerService {
        &self.manager
    }

    pub fn admin_employees(&self) -> &AdminEmployeeService {
        &self.admin_employees
    }

    pub fn admin_payroll(&self) -> &AdminPayrollService {
        &self.admin_payroll
    }
}

/// Builder for [`HrmsClient`]
#[derive(Default)]
pub struct HrmsClientBuilder {
    config: Option<ClientConfig>,
    storage: Option<Arc<dyn SessionStorage>>,
    routes: Option<RouteTable>,
}

impl HrmsClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Session storage; defaults to a [`FileStorage`] at `config.session_file`
    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Route table for the gate; defaults to [`RouteTable::hrms`]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }

    /// # Errors
    ///
    /// Returns `ClientError::Config` if the HTTP client cannot be created.
    pub fn build(self) -> ClientResult<HrmsClient> {
        let config = self.config.unwrap_or_default();
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(FileStorage::new(&config.session_file)) as Arc<dyn SessionStorage>);

        let session = Arc::new(SessionStore::new(storage));
        let queries = Arc::new(QueryClient::new(config.query.clone()));
        let api = Arc::new(ApiClient::new(&config, session.clone())?.with_query_cache(queries.clone()));
        let gate = AuthGate::new(
            session.clone(),
            self.routes.unwrap_or_else(RouteTable::hrms),
            &config,
        );
        let ctx = ServiceContext::new(api.clone(), queries.clone());

        tracing::debug!(base_url = %config.base_url, "HRMS client built");

        Ok(HrmsClient {
            auth: AuthService::new(ctx.clone(), session.clone(), &config),
            employee: EmployeeService::new(ctx.clone()),
            timesheets: TimesheetService::new(ctx.clone()),
            payroll: PayrollService::new(ctx.clone()),
            manager: ManagerService::new(ctx.clone()),
            admin_employees: AdminEmployeeService::new(ctx.clone()),
            admin_payroll: AdminPayrollService::new(ctx),
            config,
            session,
            api,
            queries,
            gate,
        })
    }
}
