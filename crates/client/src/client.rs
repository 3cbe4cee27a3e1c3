//! HTTP client for the warehouse API.

use crate::wire::{
    ErrorBody, HealthStatus, ItemHistoryResponse, ItemMovement, ItemResponse, LoginRequest,
    LoginResponse, MoveResponse,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use shelfscan_core::{
    AuthError, Authenticator, ItemInfo, LookupError, MoveError, MoveRequest, MoveService, Session,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Transport-level failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Network connection failed: {0}")]
    Connect(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ClientError {
    /// Connection failures never reached the server, so any request may be
    /// retried. Timeouts and 5xx answers are retried only for GETs.
    fn is_retryable(&self, idempotent: bool) -> bool {
        match self {
            ClientError::Connect(_) => true,
            ClientError::Timeout(_) | ClientError::Server { .. } => idempotent,
            ClientError::Http(_) | ClientError::Parse(_) => false,
        }
    }
}

/// Decoded answer: HTTP status plus parsed body.
#[derive(Debug)]
struct ApiReply<T> {
    status: StatusCode,
    body: T,
}

/// Client for the warehouse REST API.
///
/// Cheap to clone; clones share the session token.
#[derive(Clone)]
pub struct WarehouseClient {
    base_url: String,
    client: reqwest::Client,
    max_retries: u32,
    token: Arc<RwLock<Option<String>>>,
}

impl WarehouseClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Server root, e.g. `http://localhost:8080`
    /// * `timeout` - Per-request timeout
    /// * `max_retries` - Retries for retryable failures
    pub fn new(base_url: impl Into<String>, timeout: Duration, max_retries: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            max_retries,
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    /// Use an existing session token for subsequent requests.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    /// Server-side movement log for an item, newest first.
    pub async fn item_history(&self, item_id: &str) -> Result<Vec<ItemMovement>, LookupError> {
        let path = format!("/api/item/{}/history", urlencoding::encode(item_id));
        let reply: ApiReply<ItemHistoryResponse> = self
            .execute(Method::GET, &path, None)
            .await
            .map_err(|e| LookupError::Request(e.to_string()))?;

        if reply.status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(item_id.to_string()));
        }
        if !reply.body.success {
            return Err(LookupError::Request(
                reply
                    .body
                    .error
                    .unwrap_or_else(|| format!("HTTP {}", reply.status)),
            ));
        }

        let mut movements = reply.body.movements;
        movements.sort_by(|a, b| b.moved_at.cmp(&a.moved_at));
        Ok(movements)
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let reply: ApiReply<HealthStatus> = self.execute(Method::GET, "/health", None).await?;
        Ok(reply.body)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis((250_u64.saturating_mul(2_u64.saturating_pow(attempt))).min(5000))
    }

    async fn execute<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiReply<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let idempotent = method == Method::GET;
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            debug!(
                "{} {} attempt {}/{}",
                method,
                url,
                attempt + 1,
                self.max_retries + 1
            );

            match self.execute_once(method.clone(), &url, body).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_retryable(idempotent) => {
                    warn!("{} {} failed (attempt {}): {}", method, url, attempt + 1, e);
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay(attempt)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ClientError::Http("Request was not attempted".to_string())))
    }

    async fn execute_once<T>(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiReply<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let mut req_builder = self.client.request(method, url);

        let token = self.token.read().clone();
        if let Some(token) = token {
            req_builder = req_builder.bearer_auth(token);
        }
        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder.send().await.map_err(|e| {
            if e.is_connect() {
                ClientError::Connect(e.to_string())
            } else if e.is_timeout() {
                ClientError::Timeout(e.to_string())
            } else {
                ClientError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(e.to_string())
            } else {
                ClientError::Http(e.to_string())
            }
        })?;

        if status.is_server_error() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        let body = serde_json::from_str(&text).map_err(|e| {
            ClientError::Parse(format!("HTTP {}: {}", status, e))
        })?;

        Ok(ApiReply { status, body })
    }
}

/// Pull the server's error text out of a failure body.
fn error_message(status: StatusCode, text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<ErrorBody>(text) {
        if let Some(message) = body.error.or(body.message) {
            return message;
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[async_trait]
impl MoveService for WarehouseClient {
    async fn lookup_item(&self, item_id: &str) -> Result<ItemInfo, LookupError> {
        let path = format!("/api/item/{}", urlencoding::encode(item_id));
        let reply: ApiReply<ItemResponse> = self
            .execute(Method::GET, &path, None)
            .await
            .map_err(|e| match e {
                ClientError::Server { message, .. } => LookupError::Request(message),
                other => LookupError::Request(other.to_string()),
            })?;

        let ApiReply { status, body } = reply;
        match body {
            ItemResponse {
                success: true,
                item: Some(item),
                ..
            } => Ok(item.into_info(item_id)),
            ItemResponse { error, .. } => {
                if status == StatusCode::NOT_FOUND || status.is_success() {
                    debug!("Item {} not found: {:?}", item_id, error);
                    Err(LookupError::NotFound(item_id.to_string()))
                } else {
                    Err(LookupError::Request(
                        error.unwrap_or_else(|| format!("HTTP {}", status)),
                    ))
                }
            }
        }
    }

    async fn record_move(&self, request: &MoveRequest) -> Result<(), MoveError> {
        let body = serde_json::to_value(request)
            .map_err(|e| MoveError::Request(format!("Failed to encode move: {}", e)))?;

        let reply: ApiReply<MoveResponse> = self
            .execute(Method::POST, "/api/move", Some(&body))
            .await
            .map_err(|e| match e {
                ClientError::Server { message, .. } => MoveError::Rejected(message),
                other => MoveError::Request(other.to_string()),
            })?;

        if reply.body.success {
            info!(
                "Move of {} to {} accepted: {}",
                request.item_id,
                request.to_location_id,
                reply.body.message.as_deref().unwrap_or("ok")
            );
            return Ok(());
        }

        Err(MoveError::Rejected(
            reply
                .body
                .error
                .unwrap_or_else(|| format!("HTTP {}", reply.status)),
        ))
    }
}

#[async_trait]
impl Authenticator for WarehouseClient {
    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let body = serde_json::to_value(LoginRequest { username, password })
            .map_err(|e| AuthError::Request(format!("Failed to encode login: {}", e)))?;

        let reply: ApiReply<LoginResponse> = self
            .execute(Method::POST, "/api/login", Some(&body))
            .await
            .map_err(|e| AuthError::Request(e.to_string()))?;

        let ApiReply { status, body } = reply;
        if !body.success {
            return Err(AuthError::Rejected(
                body.error.unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }

        let (Some(token), Some(user_id)) = (body.token, body.user_id) else {
            return Err(AuthError::Request(
                "Login response is missing token or user_id".to_string(),
            ));
        };

        let session = Session {
            token: token.clone(),
            user_id,
            username: body.username.unwrap_or_else(|| username.to_string()),
            role: body.role.unwrap_or_default(),
        };
        self.set_token(Some(token));
        info!("Logged in as {} ({})", session.username, session.role);

        Ok(session)
    }

    async fn logout(&self) {
        self.set_token(None);
        info!("Logged out");
    }
}
