//! # Panel Client
//!
//! Thin wrapper over the panel's `/api/application` REST API.
//! Every call goes through one pooled `reqwest::Client` and resolves to an [`ApiResult`];
//! nothing here returns an error for a failed request.

use async_trait::async_trait;
use rand::Rng;
use rand::rngs::OsRng;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use super::types::{ApiResult, BuildPayload, NewServer, NewUser, SecretResult, UserPayload};
use crate::domain::traits::PanelApi;
use crate::domain::types::ResourceUpdate;

const API_PREFIX: &str = "/api/application";
const ACCEPT_VERSION: &str = "application/vnd.pterodactyl.v1+json";
const PING_TIMEOUT: Duration = Duration::from_secs(10);
const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Errors raised while setting the client up. Fatal at start-up.
#[derive(Debug, thiserror::Error)]
pub enum PanelSetupError {
    #[error("panel URL is not set")]
    MissingUrl,
    #[error("panel API key is not set")]
    MissingKey,
    #[error("panel API key contains characters that are not valid in an HTTP header")]
    InvalidKey,
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Base URL + API key for the panel.
#[derive(Clone)]
pub struct PanelCredentials {
    base_url: String,
    api_key: String,
}

impl PanelCredentials {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, PanelSetupError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(PanelSetupError::MissingUrl);
        }
        if api_key.trim().is_empty() {
            return Err(PanelSetupError::MissingKey);
        }
        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Result<HeaderMap, PanelSetupError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| PanelSetupError::InvalidKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl fmt::Debug for PanelCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelCredentials")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Generates a password from the fixed alphabet using the OS CSPRNG.
pub fn random_password(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| PASSWORD_ALPHABET[rng.gen_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect()
}

/// Panel API client with an explicit session lifecycle.
///
/// The HTTP session is created on first use (or by [`open`](Self::open)) and
/// dropped by [`close`](Self::close). It is shared by all concurrent callers.
pub struct PanelClient {
    credentials: PanelCredentials,
    headers: HeaderMap,
    password_length: usize,
    session: Mutex<Option<reqwest::Client>>,
}

impl PanelClient {
    pub fn new(credentials: PanelCredentials, password_length: usize) -> Result<Self, PanelSetupError> {
        let headers = credentials.headers()?;
        Ok(Self {
            credentials,
            headers,
            password_length,
            session: Mutex::new(None),
        })
    }

    /// Creates the HTTP session now instead of on the first request.
    pub fn open(&self) -> Result<(), PanelSetupError> {
        self.session()?;
        Ok(())
    }

    /// Drops the HTTP session; idle pooled connections close with it.
    pub fn close(&self) {
        let mut guard = self.session.lock().unwrap_or_else(|p| p.into_inner());
        if guard.take().is_some() {
            tracing::info!("Panel HTTP session closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }

    fn session(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut guard = self.session.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }
        let client = reqwest::Client::builder()
            .default_headers(self.headers.clone())
            .build()?;
        tracing::debug!("Panel HTTP session created for {}", self.credentials.base_url());
        *guard = Some(client.clone());
        Ok(client)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.credentials.base_url(), API_PREFIX, path)
    }

    /// Sends one request and folds every outcome into an [`ApiResult`].
    async fn execute<F>(&self, method: Method, path: &str, customize: F) -> ApiResult
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let client = match self.session() {
            Ok(client) => client,
            Err(e) => return ApiResult::transport_error(format!("HTTP client unavailable: {e}")),
        };

        let request = customize(client.request(method.clone(), self.url(path)));
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Panel {} {} failed: {}", method, path, e);
                return ApiResult::transport_error(e.to_string());
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Panel {} {} -> {}: unreadable body: {}", method, path, status, e);
                String::new()
            }
        };
        tracing::debug!("Panel {} {} -> {}", method, path, status);
        ApiResult::from_body(status, &body)
    }

    async fn get(&self, path: &str) -> ApiResult {
        self.execute(Method::GET, path, |r| r).await
    }

    async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> ApiResult {
        self.execute(Method::GET, path, |r| r.query(query)).await
    }

    async fn send_json<T: Serialize + ?Sized>(&self, method: Method, path: &str, body: &T) -> ApiResult {
        self.execute(method, path, |r| r.json(body)).await
    }

    async fn post_empty(&self, path: &str) -> ApiResult {
        self.execute(Method::POST, path, |r| r).await
    }

    async fn delete(&self, path: &str) -> ApiResult {
        self.execute(Method::DELETE, path, |r| r).await
    }
}

#[async_trait]
impl PanelApi for PanelClient {
    fn base_url(&self) -> &str {
        self.credentials.base_url()
    }

    async fn get_node(&self, node_id: u64) -> ApiResult {
        self.get(&format!("/nodes/{node_id}")).await
    }

    async fn list_nodes(&self) -> ApiResult {
        self.get("/nodes").await
    }

    async fn get_node_allocations(&self, node_id: u64) -> ApiResult {
        self.get(&format!("/nodes/{node_id}/allocations")).await
    }

    async fn get_egg(&self, egg_id: u64) -> ApiResult {
        self.get_with_query(&format!("/eggs/{egg_id}"), &[("include", "variables")])
            .await
    }

    async fn list_eggs(&self) -> ApiResult {
        // Eggs live under nests; one request returns both.
        self.get_with_query("/nests", &[("include", "eggs")]).await
    }

    async fn get_server(&self, server_id: &str) -> ApiResult {
        self.get(&format!("/servers/{server_id}")).await
    }

    async fn list_servers(&self) -> ApiResult {
        self.get("/servers").await
    }

    async fn create_server(&self, server: &NewServer) -> ApiResult {
        self.send_json(Method::POST, "/servers", server).await
    }

    async fn set_server_resources(&self, server_id: &str, update: &ResourceUpdate) -> ApiResult {
        let payload = BuildPayload::from_update(update);
        self.send_json(Method::PATCH, &format!("/servers/{server_id}/build"), &payload)
            .await
    }

    async fn suspend_server(&self, server_id: &str) -> ApiResult {
        self.post_empty(&format!("/servers/{server_id}/suspend")).await
    }

    async fn unsuspend_server(&self, server_id: &str) -> ApiResult {
        self.post_empty(&format!("/servers/{server_id}/unsuspend")).await
    }

    async fn delete_server(&self, server_id: &str) -> ApiResult {
        self.delete(&format!("/servers/{server_id}")).await
    }

    async fn list_backups(&self, server_id: &str) -> ApiResult {
        self.get(&format!("/servers/{server_id}/backups")).await
    }

    async fn list_users(&self) -> ApiResult {
        self.get("/users").await
    }

    async fn search_users(&self, query: &str) -> ApiResult {
        self.get_with_query("/users", &[("filter[email]", query)]).await
    }

    async fn find_user_by_email(&self, email: &str) -> ApiResult {
        self.get_with_query("/users", &[("filter[email]", email)]).await
    }

    async fn create_user(&self, user: NewUser) -> SecretResult {
        let password = user
            .password
            .unwrap_or_else(|| random_password(self.password_length));
        let payload = UserPayload {
            email: &user.email,
            username: &user.username,
            first_name: &user.first_name,
            last_name: &user.last_name,
            password: &password,
        };
        let result = self.send_json(Method::POST, "/users", &payload).await;
        let password = result.is_created().then_some(password);
        SecretResult { result, password }
    }

    async fn delete_user(&self, user_id: u64) -> ApiResult {
        self.delete(&format!("/users/{user_id}")).await
    }

    async fn reset_password(&self, user_id: u64, password: Option<String>) -> SecretResult {
        // Panel versions disagree on this route; only the canonical one is tried.
        let password = password.unwrap_or_else(|| random_password(self.password_length));
        let payload = serde_json::json!({ "password": password });
        let result = self
            .send_json(Method::POST, &format!("/users/{user_id}/reset-password"), &payload)
            .await;
        let password = result.is_empty_ok().then_some(password);
        SecretResult { result, password }
    }

    async fn ping_panel(&self) -> bool {
        let result = self
            .execute(Method::GET, "", |r| r.timeout(PING_TIMEOUT))
            .await;
        result.status == 200
    }
}
