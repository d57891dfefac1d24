// hrms-client/src/http.rs
// HTTP 客户端 - Bearer 认证、错误映射、401/403 拦截

use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{RefreshTokenRequest, RefreshTokenResponse};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::query::QueryClient;
use crate::session::SessionStore;

const LOGIN_PATH: &str = "auth/login";
const REFRESH_PATH: &str = "auth/refresh";

/// Query string pairs
pub type Query<'a> = [(&'a str, String)];

/// Bearer-authenticated HTTP client for the HRMS API
///
/// A 401 or 403 on anything but the login call ends the session and drops
/// the attached query cache. With `auto_refresh` on, a 401 first tries one
/// token refresh and replays the request once; a refresh that fails
/// transiently leaves the session in place.
pub struct ApiClient {
    client: Client,
    base_url: String,
    auto_refresh: bool,
    session: Arc<SessionStore>,
    queries: Option<Arc<QueryClient>>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ClientResult<Self> {
        if config.base_url.is_empty() {
            return Err(ClientError::Config("base_url is required".into()));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auto_refresh: config.auto_refresh,
            session,
            queries: None,
            refresh_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Cache to clear whenever the backend ends the session
    pub fn with_query_cache(mut self, queries: Arc<QueryClient>) -> Self {
        self.queries = Some(queries);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> ClientResult<T> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::POST, path, &[], None).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::PATCH, path, &[], None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// Issue a request with the current access token attached
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        body: Option<Value>,
    ) -> ClientResult<T> {
        let token = self.session.access_token();
        let response = self
            .send(&method, path, query, body.as_ref(), token.as_deref())
            .await?;
        let status = response.status();
        tracing::debug!(method = %method, path, status = status.as_u16(), "API request");
        if status.is_success() {
            return decode(response).await;
        }

        let err = error_from(response).await;

        if is_endpoint(path, LOGIN_PATH) {
            return Err(match err {
                ClientError::Unauthorized { message } => ClientError::InvalidCredentials {
                    status: StatusCode::UNAUTHORIZED.as_u16(),
                    message,
                },
                ClientError::Forbidden { message } => ClientError::InvalidCredentials {
                    status: StatusCode::FORBIDDEN.as_u16(),
                    message,
                },
                other => other,
            });
        }

        let can_refresh = status == StatusCode::UNAUTHORIZED
            && self.auto_refresh
            && !is_endpoint(path, REFRESH_PATH)
            && self.session.refresh_token().is_some();
        if !can_refresh {
            return Err(self.reject(err));
        }

        if let Err(refresh_err) = self.refresh_after_rejection(token.as_deref()).await {
            if refresh_err.is_transient() {
                tracing::warn!(error = %refresh_err, "Token refresh unavailable, keeping session");
                return Err(refresh_err);
            }
            tracing::warn!(error = %refresh_err, "Token refresh rejected, ending session");
            self.end_session();
            return Err(err);
        }

        // Replay once with the new token
        let token = self.session.access_token();
        let response = self
            .send(&method, path, query, body.as_ref(), token.as_deref())
            .await?;
        if response.status().is_success() {
            return decode(response).await;
        }
        let err = error_from(response).await;
        Err(self.reject(err))
    }

    /// Exchange the stored refresh token for a new access token
    pub async fn refresh_session(&self) -> ClientResult<RefreshTokenResponse> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or_else(|| ClientError::InvalidState("no refresh token stored".into()))?;
        let body = serde_json::to_value(RefreshTokenRequest { refresh_token })?;

        let response = self
            .send(&Method::POST, REFRESH_PATH, &[], Some(&body), None)
            .await?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        let tokens: RefreshTokenResponse = decode(response).await?;
        self.session
            .refresh_tokens(&tokens.access_token, tokens.refresh_token.as_deref());
        Ok(tokens)
    }

    async fn refresh_after_rejection(&self, rejected_token: Option<&str>) -> ClientResult<()> {
        let _guard = self.refresh_lock.lock().await;
        // Another request may have refreshed while this one waited
        let current = self.session.access_token();
        if current.is_some() && current.as_deref() != rejected_token {
            return Ok(());
        }
        self.refresh_session().await.map(|_| ())
    }

    fn reject(&self, err: ClientError) -> ClientError {
        if matches!(
            err,
            ClientError::Unauthorized { .. } | ClientError::Forbidden { .. }
        ) {
            tracing::warn!(error = %err, "Request rejected, ending session");
            self.end_session();
        }
        err
    }

    fn end_session(&self) {
        self.session.expire();
        if let Some(queries) = &self.queries {
            queries.clear();
        }
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        query: &Query<'_>,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> ClientResult<Response> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut req = self.client.request(method.clone(), &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(token) = token {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token));
        }
        Ok(req.send().await?)
    }
}

fn is_endpoint(path: &str, endpoint: &str) -> bool {
    path.trim_start_matches('/').trim_end_matches('/') == endpoint
}

async fn error_from(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    ClientError::from_response(status, &text)
}

/// Empty bodies decode as JSON `null`, so `()` and `Option<T>` work
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let text = response.text().await?;
    let body = if text.trim().is_empty() {
        "null"
    } else {
        text.as_str()
    };
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStorage;

    #[test]
    fn test_endpoint_matching() {
        assert!(is_endpoint("/auth/login", LOGIN_PATH));
        assert!(is_endpoint("auth/login/", LOGIN_PATH));
        assert!(!is_endpoint("/auth/logout", LOGIN_PATH));
    }

    #[test]
    fn test_requires_base_url() {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
        let config = ClientConfig::new("");
        assert!(matches!(
            ApiClient::new(&config, session.clone()),
            Err(ClientError::Config(_))
        ));

        let client = ApiClient::new(&ClientConfig::new("http://localhost:8080/api/"), session).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }
}
