//! In-process mock of the HRMS backend

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dashmap::DashMap;
use hrms_client::{ClientConfig, HrmsClient, MemoryStorage, QueryConfig, RetryPolicy};
use parking_lot::Mutex;
use serde_json::{Value, json};

/// Shared state of the mock server
#[derive(Default)]
pub struct MockState {
    hits: DashMap<String, usize>,
    /// Access tokens the server currently accepts
    pub valid_tokens: Mutex<HashSet<String>>,
    /// Refresh tokens the server currently accepts
    pub valid_refresh: Mutex<HashSet<String>>,
    /// Remaining 503 answers for the dashboard
    pub dashboard_failures: AtomicUsize,
    /// Remaining 503 answers for token refresh
    pub refresh_failures: AtomicUsize,
    /// Handler-side log, used to check ordering against the client
    pub journal: Mutex<Vec<String>>,
    /// Artificial latency for read endpoints
    pub read_delay_ms: AtomicUsize,
}

impl MockState {
    pub fn hits(&self, route: &str) -> usize {
        self.hits.get(route).map(|n| *n).unwrap_or(0)
    }

    pub fn revoke(&self, token: &str) {
        self.valid_tokens.lock().remove(token);
    }

    fn hit(&self, route: &str) {
        *self.hits.entry(route.to_string()).or_default() += 1;
        self.journal.lock().push(format!("hit {route}"));
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        match token {
            Some(token) if self.valid_tokens.lock().contains(token) => Ok(()),
            _ => Err(error(StatusCode::UNAUTHORIZED, "Full authentication is required")),
        }
    }

    async fn read_delay(&self) {
        let ms = self.read_delay_ms.load(Ordering::SeqCst) as u64;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Client against this backend with in-memory session storage and fast retries
    pub fn client(&self) -> (HrmsClient, MemoryStorage) {
        let storage = MemoryStorage::new();
        let client = HrmsClient::builder()
            .config(self.config())
            .storage(Arc::new(storage.clone()))
            .build()
            .expect("client builds");
        (client, storage)
    }

    pub fn config(&self) -> ClientConfig {
        let fast = |retries| {
            RetryPolicy::queries()
                .with_max_retries(retries)
                .with_base_delay(Duration::from_millis(10))
        };
        ClientConfig::new(&self.base_url)
            .with_timeout(Duration::from_secs(5))
            .with_query_config(QueryConfig {
                query_retry: fast(3),
                mutation_retry: fast(1),
                ..QueryConfig::default()
            })
    }
}

pub async fn spawn_backend() -> MockBackend {
    hrms_client::logger::init_test_logger();

    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/employee/profile", get(profile))
        .route("/api/employee/dashboard", get(dashboard))
        .route("/api/employee/contact-info", get(contact_info).put(update_contact_info))
        .route("/api/admin/employees", get(admin_employees))
        .route("/api/manager/timesheets/pending/count", get(pending_count))
        .route("/api/manager/timesheets/{id}/approve", post(approve))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });

    MockBackend {
        base_url: format!("http://{addr}/api"),
        state,
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "timestamp": "2024-03-01T10:00:00",
            "status": status.as_u16(),
            "error": status.canonical_reason(),
            "message": message,
            "path": "/api",
        })),
    )
        .into_response()
}

pub fn auth_user(username: &str) -> Option<Value> {
    let (id, role, first_login) = match username {
        "jdoe" => (7, "EMPLOYEE", false),
        "newbie" => (8, "EMPLOYEE", true),
        "boss" => (9, "MANAGER", false),
        "root" => (1, "ADMIN", false),
        _ => return None,
    };
    Some(json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "firstName": "Test",
        "lastName": username,
        "role": role,
        "isFirstLogin": first_login,
    }))
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.hit("login");
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let Some(employee) = auth_user(username).filter(|_| password == "secret") else {
        return error(StatusCode::UNAUTHORIZED, "Invalid username or password");
    };

    state.valid_tokens.lock().insert("access-1".into());
    state.valid_refresh.lock().insert("refresh-1".into());
    Json(json!({
        "accessToken": "access-1",
        "refreshToken": "refresh-1",
        "tokenType": "Bearer",
        "expiresIn": 900000,
        "employee": employee,
    }))
    .into_response()
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.hit("refresh");
    let remaining = state.refresh_failures.load(Ordering::SeqCst);
    if remaining > 0 {
        state.refresh_failures.store(remaining - 1, Ordering::SeqCst);
        return error(StatusCode::SERVICE_UNAVAILABLE, "Service temporarily unavailable");
    }
    let token = body["refreshToken"].as_str().unwrap_or_default().to_string();
    if !state.valid_refresh.lock().remove(&token) {
        return error(StatusCode::UNAUTHORIZED, "Invalid refresh token");
    }
    state.valid_tokens.lock().insert("access-2".into());
    state.valid_refresh.lock().insert("refresh-2".into());
    Json(json!({
        "accessToken": "access-2",
        "refreshToken": "refresh-2",
        "tokenType": "Bearer",
        "expiresIn": 900000,
    }))
    .into_response()
}

async fn logout(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.hit("logout");
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }
    Json(json!({"message": "Logged out successfully"})).into_response()
}

async fn reset_password(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.hit("reset-password");
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }
    Json(json!({"message": "Password reset successfully"})).into_response()
}

fn employee_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "employeeId": format!("EMP{id:03}"),
        "username": username,
        "email": format!("{username}@example.com"),
        "firstName": "Test",
        "lastName": username,
        "hireDate": "2021-04-01",
        "role": "EMPLOYEE",
        "isFirstLogin": false,
        "isActive": true,
        "createdAt": "2021-04-01T09:00:00",
        "updatedAt": "2024-02-01T09:00:00",
    })
}

async fn profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.hit("profile");
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }
    state.read_delay().await;
    Json(employee_json(7, "jdoe")).into_response()
}

async fn dashboard(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.hit("dashboard");
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }
    let remaining = state.dashboard_failures.load(Ordering::SeqCst);
    if remaining > 0 {
        state.dashboard_failures.store(remaining - 1, Ordering::SeqCst);
        return error(StatusCode::SERVICE_UNAVAILABLE, "Service temporarily unavailable");
    }
    Json(json!({
        "personalInfo": employee_json(7, "jdoe"),
        "recentActivity": [],
        "stats": {"currentTimesheetStatus": "DRAFT"},
    }))
    .into_response()
}

async fn contact_info(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.hit("contact-info");
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }
    Json(json!({
        "id": 7,
        "phoneNumber": "555-0100",
        "address": {"city": "Springfield"},
        "updatedAt": "2024-02-01T09:00:00",
    }))
    .into_response()
}

async fn update_contact_info(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.hit("update-contact-info");
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }
    if body["phoneNumber"].as_str() == Some("bad") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": 400,
                "error": "Validation Failed",
                "message": "Input validation failed",
                "validationErrors": {"phoneNumber": "Invalid phone number format"},
            })),
        )
            .into_response();
    }
    state.read_delay().await;
    state.journal.lock().push("update-contact-info responded".into());
    Json(json!({"message": "Contact information updated successfully"})).into_response()
}

async fn admin_employees(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.hit("admin-employees");
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }
    error(StatusCode::FORBIDDEN, "Access denied")
}

async fn pending_count(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.hit("pending-count");
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }
    Json(json!(3)).into_response()
}

async fn approve(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    state.hit("approve");
    if let Err(rejected) = state.authorize(&headers) {
        return rejected;
    }
    Json(json!({"message": format!("Timesheet {id} approved")})).into_response()
}
