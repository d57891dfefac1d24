//! Route authorization gate
//!
//! Decides, for a path the user is trying to open, whether to render it or
//! where to send them instead. Decisions are pure reads of the session
//! store and never fail.

use std::sync::Arc;

use shared::RoleSet;

use crate::config::ClientConfig;
use crate::routes::{Access, RouteTable, strip_query};
use crate::session::SessionStore;

/// Outcome of a route check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session not restored yet; show a loading state
    Pending,
    Allow,
    /// No session; come back to `return_path` after logging in
    RedirectToLogin { return_path: String },
    /// Logged in but the role is not allowed here
    RedirectToDashboard,
    /// First login; the password must be changed before anything else
    RedirectToPasswordReset,
    /// Guest-only page visited with a session
    Redirect(String),
    /// No such page
    RedirectToHome,
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

pub struct AuthGate {
    session: Arc<SessionStore>,
    routes: RouteTable,
    login_path: String,
    dashboard_path: String,
    password_reset_path: String,
}

impl AuthGate {
    pub fn new(session: Arc<SessionStore>, routes: RouteTable, config: &ClientConfig) -> Self {
        Self {
            session,
            routes,
            login_path: config.login_path.clone(),
            dashboard_path: config.dashboard_path.clone(),
            password_reset_path: config.password_reset_path.clone(),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Check a protected view at `current_path`
    ///
    /// Precedence: pending, login, password reset, role, allow. A first-login
    /// user is sent to the reset page even from a page their role forbids.
    pub fn evaluate(&self, current_path: &str, required_roles: Option<RoleSet>) -> GateDecision {
        if self.session.is_initializing() {
            return GateDecision::Pending;
        }

        let user = match self.session.user() {
            Some(user) if self.session.is_authenticated() => user,
            _ => {
                tracing::debug!(path = current_path, "No session, redirecting to login");
                return GateDecision::RedirectToLogin {
                    return_path: current_path.to_string(),
                };
            }
        };

        if user.is_first_login && strip_query(current_path) != self.password_reset_path {
            tracing::debug!(path = current_path, "First login, redirecting to password reset");
            return GateDecision::RedirectToPasswordReset;
        }

        if required_roles.is_some_and(|roles| !roles.contains(user.role)) {
            tracing::debug!(path = current_path, role = %user.role, "Role not allowed");
            return GateDecision::RedirectToDashboard;
        }

        GateDecision::Allow
    }

    /// Check a guest-only view (landing, login)
    pub fn evaluate_guest(&self, return_path: Option<&str>) -> GateDecision {
        if self.session.is_initializing() {
            return GateDecision::Pending;
        }
        if self.session.is_authenticated() {
            let target = return_path.unwrap_or(&self.dashboard_path);
            return GateDecision::Redirect(target.to_string());
        }
        GateDecision::Allow
    }

    /// Look `path` up in the route table and apply the matching check
    pub fn navigate(&self, path: &str) -> GateDecision {
        let Some(matched) = self.routes.resolve(path) else {
            tracing::debug!(path, "Unknown route");
            return GateDecision::RedirectToHome;
        };
        match matched.route.access() {
            Access::Public => GateDecision::Allow,
            Access::Guest => self.evaluate_guest(None),
            Access::Protected(roles) => self.evaluate(path, roles),
        }
    }

    /// Concrete path a decision points at, `None` for `Pending` and `Allow`
    pub fn redirect_target(&self, decision: &GateDecision) -> Option<String> {
        match decision {
            GateDecision::Pending | GateDecision::Allow => None,
            GateDecision::RedirectToLogin { .. } => Some(self.login_path.clone()),
            GateDecision::RedirectToDashboard => Some(self.dashboard_path.clone()),
            GateDecision::RedirectToPasswordReset => Some(self.password_reset_path.clone()),
            GateDecision::Redirect(path) => Some(path.clone()),
            GateDecision::RedirectToHome => Some("/".to_string()),
        }
    }
}
