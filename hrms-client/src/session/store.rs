// hrms-client/src/session/store.rs
// 会话状态 - 登录、登出、用户信息

use std::sync::Arc;

use parking_lot::RwLock;
use shared::{EmployeeAuthInfo, Role, RoleSet};
use tokio::sync::broadcast;

use super::storage::{
    ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, SessionStorage, USER_KEY,
};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Persisted session not read yet
    Initializing,
    Anonymous,
    Authenticated,
}

/// Session change notifications
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LoggedIn(EmployeeAuthInfo),
    LoggedOut,
    UserUpdated(EmployeeAuthInfo),
    TokensRefreshed,
    /// The backend rejected the session (401/403 or failed refresh)
    Expired,
}

/// Partial profile update; `None` fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub is_first_login: Option<bool>,
}

impl UserPatch {
    /// Patch clearing the first-login flag after a password reset
    pub fn password_reset_done() -> Self {
        Self {
            is_first_login: Some(false),
            ..Default::default()
        }
    }

    fn apply(self, user: &mut EmployeeAuthInfo) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(is_first_login) = self.is_first_login {
            user.is_first_login = is_first_login;
        }
    }
}

struct Inner {
    /// `initialize()` has run
    initialized: bool,
    user: Option<EmployeeAuthInfo>,
}

impl Inner {
    fn state(&self, has_token: bool) -> SessionState {
        match (self.initialized, &self.user) {
            (false, _) => SessionState::Initializing,
            (true, Some(_)) if has_token => SessionState::Authenticated,
            _ => SessionState::Anonymous,
        }
    }
}

/// Source of truth for "is a user logged in"
///
/// Every transition happens under a single write lock, so readers never see
/// a half-applied login or logout.
pub struct SessionStore {
    inner: RwLock<Inner>,
    storage: Arc<dyn SessionStorage>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: RwLock::new(Inner {
                initialized: false,
                user: None,
            }),
            storage,
            events,
        }
    }

    /// Restore the persisted session
    ///
    /// Any outcome other than a restored session wipes every session key,
    /// including a refresh token left behind on its own.
    pub fn initialize(&self) -> SessionState {
        let mut inner = self.inner.write();
        inner.initialized = true;

        let token = self.storage.get(ACCESS_TOKEN_KEY);
        let user_json = self.storage.get(USER_KEY);

        let restored = match (token, user_json) {
            (Ok(Some(_)), Ok(Some(json))) => match serde_json::from_str::<EmployeeAuthInfo>(&json) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Stored user profile is unreadable, clearing session");
                    None
                }
            },
            (Ok(None), Ok(None)) => {
                tracing::debug!("No stored session");
                None
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Session storage unreadable, clearing session");
                None
            }
            _ => {
                tracing::warn!("Stored session is incomplete, clearing session");
                None
            }
        };

        match restored {
            Some(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "Session restored");
                inner.user = Some(user);
            }
            None => {
                self.purge();
                inner.user = None;
            }
        }
        inner.state(self.read_key(ACCESS_TOKEN_KEY).is_some())
    }

    /// Record a logged-in user; tokens are stored separately via [`Self::set_tokens`]
    pub fn login(&self, user: EmployeeAuthInfo) {
        {
            let mut inner = self.inner.write();
            match serde_json::to_string(&user) {
                Ok(json) => self.write_key(USER_KEY, &json),
                Err(e) => tracing::warn!(error = %e, "Failed to encode user profile"),
            }
            inner.user = Some(user.clone());
        }
        tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "Logged in");
        let _ = self.events.send(SessionEvent::LoggedIn(user));
    }

    /// Persist the access token, and the refresh token when one is given
    pub fn set_tokens(&self, access_token: &str, refresh_token: Option<&str>) {
        let _inner = self.inner.write();
        self.write_key(ACCESS_TOKEN_KEY, access_token);
        if let Some(refresh_token) = refresh_token {
            self.write_key(REFRESH_TOKEN_KEY, refresh_token);
        }
    }

    /// Replace tokens after a successful refresh and notify subscribers
    pub fn refresh_tokens(&self, access_token: &str, refresh_token: Option<&str>) {
        self.set_tokens(access_token, refresh_token);
        tracing::debug!(rotated = refresh_token.is_some(), "Access token refreshed");
        let _ = self.events.send(SessionEvent::TokensRefreshed);
    }

    /// Clear the session. Safe to call any number of times.
    pub fn logout(&self) {
        if self.clear() {
            tracing::info!("Logged out");
            let _ = self.events.send(SessionEvent::LoggedOut);
        }
    }

    /// End a session the backend rejected
    pub fn expire(&self) {
        if self.clear() {
            tracing::warn!("Session rejected by server, logged out");
            let _ = self.events.send(SessionEvent::Expired);
        }
    }

    /// Merge `patch` into the current profile; no-op when anonymous
    pub fn update_user(&self, patch: UserPatch) -> bool {
        let updated = {
            let mut inner = self.inner.write();
            let Some(user) = inner.user.as_mut() else {
                tracing::debug!("update_user ignored, no active session");
                return false;
            };
            patch.apply(user);
            let snapshot = user.clone();
            match serde_json::to_string(&snapshot) {
                Ok(json) => self.write_key(USER_KEY, &json),
                Err(e) => tracing::warn!(error = %e, "Failed to encode user profile"),
            }
            snapshot
        };
        let _ = self.events.send(SessionEvent::UserUpdated(updated));
        true
    }

    /// Logged-in user present AND an access token stored
    ///
    /// Reads storage on every call, so a token removed underneath the store
    /// is noticed immediately.
    pub fn is_authenticated(&self) -> bool {
        let inner = self.inner.read();
        inner.user.is_some() && self.read_key(ACCESS_TOKEN_KEY).is_some()
    }

    /// Whether the current user's role is in `roles`
    pub fn has_role(&self, roles: impl Into<RoleSet>) -> bool {
        let roles = roles.into();
        self.inner
            .read()
            .user
            .as_ref()
            .is_some_and(|user| roles.contains(user.role))
    }

    /// Authenticated only while both a user and an access token are present
    pub fn state(&self) -> SessionState {
        let inner = self.inner.read();
        inner.state(self.read_key(ACCESS_TOKEN_KEY).is_some())
    }

    pub fn is_initializing(&self) -> bool {
        !self.inner.read().initialized
    }

    /// Snapshot of the current user
    pub fn user(&self) -> Option<EmployeeAuthInfo> {
        self.inner.read().user.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_key(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read_key(REFRESH_TOKEN_KEY)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Returns true when there was anything to clear
    fn clear(&self) -> bool {
        let mut inner = self.inner.write();
        let had_session = inner.user.is_some() || self.read_key(ACCESS_TOKEN_KEY).is_some();
        self.purge();
        inner.user = None;
        had_session
    }

    fn purge(&self) {
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove session key");
            }
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read session key");
                None
            }
        }
    }

    fn write_key(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            tracing::warn!(key, error = %e, "Failed to persist session key");
        }
    }
}
