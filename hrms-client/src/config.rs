//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | HRMS_API_URL | http://localhost:8080/api | backend base URL |
//! | HRMS_REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
//! | HRMS_SESSION_FILE | ./.hrms/session.json | persisted session |
//! | HRMS_AUTO_REFRESH | true | refresh the access token on 401 |
//! | HRMS_QUERY_STALE_MS | 300000 | default query stale time |
//! | HRMS_QUERY_GC_MS | 1800000 | idle cache entry eviction |
//! | HRMS_QUERY_RETRIES | 3 | retries for transient query failures |
//! | HRMS_MUTATION_RETRIES | 1 | retries for transient mutation failures |
//! | HRMS_LOG_LEVEL | info | log level |

use std::path::PathBuf;
use std::time::Duration;

use crate::query::RetryPolicy;

/// Client configuration for connecting to the HRMS backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, including the `/api` prefix
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// Where the file-backed session storage lives
    pub session_file: PathBuf,

    /// Try `/auth/refresh` once when a request comes back 401
    pub auto_refresh: bool,

    /// Path the gate sends unauthenticated users to
    pub login_path: String,

    /// Default landing page for authenticated users
    pub dashboard_path: String,

    /// Page a first-login user is held on until the password is changed
    pub password_reset_path: String,

    /// Query cache behaviour
    pub query: QueryConfig,

    /// Log level for [`crate::logger::init_logger`]
    pub log_level: String,
}

/// Query cache defaults
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// How long fetched data is served without refetching
    pub stale_time: Duration,
    /// Idle entries older than this are evicted by `gc()`
    pub gc_time: Duration,
    pub query_retry: RetryPolicy,
    pub mutation_retry: RetryPolicy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(30 * 60),
            query_retry: RetryPolicy::queries(),
            mutation_retry: RetryPolicy::mutations(),
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration with defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            session_file: PathBuf::from("./.hrms/session.json"),
            auto_refresh: true,
            login_path: "/login".to_string(),
            dashboard_path: "/dashboard".to_string(),
            password_reset_path: "/reset-password".to_string(),
            query: QueryConfig::default(),
            log_level: "info".to_string(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("HRMS_API_URL").unwrap_or_else(|_| "http://localhost:8080/api".into()),
        );
        if let Some(ms) = env_parse::<u64>("HRMS_REQUEST_TIMEOUT_MS") {
            config.timeout = Duration::from_millis(ms);
        }
        if let Ok(path) = std::env::var("HRMS_SESSION_FILE") {
            config.session_file = PathBuf::from(path);
        }
        if let Some(enabled) = env_parse::<bool>("HRMS_AUTO_REFRESH") {
            config.auto_refresh = enabled;
        }
        if let Some(ms) = env_parse::<u64>("HRMS_QUERY_STALE_MS") {
            config.query.stale_time = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("HRMS_QUERY_GC_MS") {
            config.query.gc_time = Duration::from_millis(ms);
        }
        if let Some(retries) = env_parse::<u32>("HRMS_QUERY_RETRIES") {
            config.query.query_retry.max_retries = retries;
        }
        if let Some(retries) = env_parse::<u32>("HRMS_MUTATION_RETRIES") {
            config.query.mutation_retry.max_retries = retries;
        }
        if let Ok(level) = std::env::var("HRMS_LOG_LEVEL") {
            config.log_level = level;
        }
        config
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the session file location
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }

    /// Enable or disable refresh-on-401
    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    /// Set the default landing page
    pub fn with_dashboard_path(mut self, path: impl Into<String>) -> Self {
        self.dashboard_path = path.into();
        self
    }

    /// Replace the query cache settings
    pub fn with_query_config(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }

    /// Full URL for an API path (`/auth/login` -> `{base_url}/auth/login`)
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080/api")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let config = ClientConfig::new("http://localhost:8080/api/");
        assert_eq!(
            config.url("/auth/login"),
            "http://localhost:8080/api/auth/login"
        );
        assert_eq!(
            config.url("employee/profile"),
            "http://localhost:8080/api/employee/profile"
        );
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.dashboard_path, "/dashboard");
        assert_eq!(config.password_reset_path, "/reset-password");
        assert!(config.auto_refresh);
        assert_eq!(config.query.stale_time, Duration::from_secs(300));
        assert_eq!(config.query.query_retry.max_retries, 3);
        assert_eq!(config.query.mutation_retry.max_retries, 1);
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::new("http://hr.internal/api")
            .with_timeout(Duration::from_secs(5))
            .with_auto_refresh(false)
            .with_dashboard_path("/home");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.auto_refresh);
        assert_eq!(config.dashboard_path, "/home");
    }
}
