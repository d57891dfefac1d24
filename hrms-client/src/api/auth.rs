// hrms-client/src/api/auth.rs
// 认证服务 - 登录、刷新、登出、重置密码

use std::sync::Arc;

use serde::de::IgnoredAny;
use shared::{
    AuthResponse, EmployeeAuthInfo, LoginRequest, LogoutRequest, MessageResponse,
    RefreshTokenResponse, ResetPasswordRequest,
};

use super::{ServiceContext, keys};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::query::{QueryOptions, RetryPolicy};
use crate::session::{SessionStore, UserPatch};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub auth: AuthResponse,
    /// Where to go next: the password reset page on first login, else the dashboard
    pub redirect_to: String,
}

impl LoginOutcome {
    pub fn user(&self) -> &EmployeeAuthInfo {
        &self.auth.employee
    }
}

#[derive(Clone)]
pub struct AuthService {
    ctx: ServiceContext,
    session: Arc<SessionStore>,
    dashboard_path: String,
    password_reset_path: String,
}

impl AuthService {
    pub fn new(ctx: ServiceContext, session: Arc<SessionStore>, config: &ClientConfig) -> Self {
        Self {
            ctx,
            session,
            dashboard_path: config.dashboard_path.clone(),
            password_reset_path: config.password_reset_path.clone(),
        }
    }

    /// Exchange credentials for a session
    ///
    /// Tokens are stored before the user, so the session only reads as
    /// authenticated once both are in place. Every cached query is
    /// invalidated afterwards.
    pub async fn login(
        &self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> ClientResult<LoginOutcome> {
        let request = LoginRequest::new(username, password);
        tracing::info!(username = %request.username, "Logging in");

        let auth: AuthResponse = self.ctx.api.post("/auth/login", &request).await?;
        if auth.access_token.is_empty() {
            return Err(ClientError::InvalidResponse(
                "login response carried no access token".into(),
            ));
        }

        self.session
            .set_tokens(&auth.access_token, Some(&auth.refresh_token));
        self.session.login(auth.employee.clone());
        self.ctx.queries.invalidate_all();

        let redirect_to = if auth.employee.is_first_login {
            self.password_reset_path.clone()
        } else {
            self.dashboard_path.clone()
        };
        Ok(LoginOutcome { auth, redirect_to })
    }

    /// Swap the refresh token for a new access token
    pub async fn refresh(&self) -> ClientResult<RefreshTokenResponse> {
        self.ctx.api.refresh_session().await
    }

    /// Revoke the refresh token server-side and clear the local session
    ///
    /// The local session is always cleared; server errors are logged only.
    pub async fn logout(&self) {
        match self.session.refresh_token() {
            Some(refresh_token) => {
                let result: ClientResult<IgnoredAny> = self
                    .ctx
                    .api
                    .post("/auth/logout", &LogoutRequest { refresh_token })
                    .await;
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Server logout failed, clearing local session anyway");
                }
            }
            None => tracing::debug!("No refresh token stored, clearing local session only"),
        }
        self.session.logout();
        self.ctx.queries.clear();
    }

    /// Revoke every session of this user
    ///
    /// The local session is cleared whatever the server says; its answer is
    /// still returned.
    pub async fn logout_all(&self) -> ClientResult<MessageResponse> {
        let result = self.ctx.api.post_empty("/auth/logout-all").await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Logout from all devices failed, clearing local session anyway");
        }
        self.session.logout();
        self.ctx.queries.clear();
        result
    }

    /// Change the password; clears the first-login flag on success
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ClientResult<MessageResponse> {
        let api = self.ctx.api.clone();
        let response = self
            .ctx
            .queries
            .mutate(&[keys::requires_password_reset()], || {
                api.post::<MessageResponse, _>("/auth/reset-password", &request)
            })
            .await?;
        self.session.update_user(UserPatch::password_reset_done());
        tracing::info!("Password reset");
        Ok(response)
    }

    /// Ask the server whether a password reset is still pending
    pub async fn requires_password_reset(&self) -> ClientResult<bool> {
        if !self.session.is_authenticated() {
            return Err(ClientError::InvalidState("not logged in".into()));
        }
        self.ctx
            .query(
                keys::requires_password_reset(),
                QueryOptions::default()
                    .stale_time(std::time::Duration::ZERO)
                    .retry(RetryPolicy::none()),
                "/auth/requires-password-reset".into(),
                Vec::new(),
            )
            .await
    }

    pub fn current_user(&self) -> Option<EmployeeAuthInfo> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}
