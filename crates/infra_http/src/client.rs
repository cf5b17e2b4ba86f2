//! Resilient authenticated API client
//!
//! Every call goes through one pipeline:
//!
//! ```text
//! request ─► attach bearer ─► send (timeout) ─► 502/503/504? ─► backoff, resend (≤ 3 attempts)
//!                                              │
//!                                              └─► 401? ─► refresh once (serialized) ─► replay once
//! ```
//!
//! The token pair is the only state shared between concurrent callers. A
//! generation counter increments whenever the pair changes; a caller that hit
//! a 401 with generation `g` only refreshes if the pair is still at `g` once it
//! holds the refresh guard, otherwise it replays with the pair the other
//! caller obtained.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use core_kernel::{AdapterHealth, FarmerId, HealthCheckResult, HealthCheckable};

use crate::config::ClientConfig;
use crate::envelope;
use crate::error::ApiError;
use crate::retry::RetryPolicy;
use crate::token::{TokenPair, TokenStore, ACCESS_TOKEN_KEY, FARMER_ID_KEY, REFRESH_TOKEN_KEY};
use crate::transport::{FilePart, HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};

/// Token rotation endpoint
pub const REFRESH_PATH: &str = "/auth/refresh";
/// Liveness endpoint, also used to wake a cold backend
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Default)]
struct AuthState {
    loaded: bool,
    tokens: Option<TokenPair>,
    farmer_id: Option<FarmerId>,
    generation: u64,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Authenticated HTTP client shared by all service adapters
pub struct ApiClient {
    config: ClientConfig,
    retry: RetryPolicy,
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn TokenStore>,
    state: RwLock<AuthState>,
    refresh_guard: Mutex<()>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client; credentials are loaded lazily from `store`
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        let retry = config.retry_policy();
        Self {
            config,
            retry,
            transport,
            store,
            state: RwLock::new(AuthState::default()),
            refresh_guard: Mutex::new(()),
        }
    }

    /// Returns the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Performs an authenticated JSON request
    ///
    /// # Errors
    ///
    /// - `SessionExpired` when no credentials exist or the refresh failed
    /// - `Connection` on timeout or after the transient retry bound
    /// - `ServerRejected` for any other non-success status
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let body = body.map(RequestBody::Json).unwrap_or_default();
        self.send_authenticated(method, path, body).await
    }

    /// Performs an authenticated multipart upload
    pub async fn upload(
        &self,
        path: &str,
        files: Vec<FilePart>,
        fields: Vec<(String, String)>,
    ) -> Result<Value, ApiError> {
        self.send_authenticated(HttpMethod::Post, path, RequestBody::Multipart { files, fields })
            .await
    }

    /// Returns true when a token pair is available
    pub async fn is_authenticated(&self) -> Result<bool, ApiError> {
        self.ensure_loaded().await?;
        Ok(self.state.read().await.tokens.is_some())
    }

    /// Identifier of the logged-in farmer, if known
    pub async fn farmer_id(&self) -> Result<Option<FarmerId>, ApiError> {
        self.ensure_loaded().await?;
        Ok(self.state.read().await.farmer_id.clone())
    }

    /// Drops the token pair from memory and durable storage
    pub async fn clear_session(&self) -> Result<(), ApiError> {
        {
            let mut state = self.state.write().await;
            state.loaded = true;
            state.tokens = None;
            state.farmer_id = None;
            state.generation += 1;
        }
        self.store.remove(ACCESS_TOKEN_KEY).await?;
        self.store.remove(REFRESH_TOKEN_KEY).await?;
        self.store.remove(FARMER_ID_KEY).await?;
        Ok(())
    }

    /// Installs a freshly issued pair and persists it
    pub(crate) async fn store_tokens(
        &self,
        tokens: TokenPair,
        farmer_id: Option<FarmerId>,
    ) -> Result<u64, ApiError> {
        let generation = {
            let mut state = self.state.write().await;
            state.loaded = true;
            state.tokens = Some(tokens.clone());
            if farmer_id.is_some() {
                state.farmer_id = farmer_id.clone();
            }
            state.generation += 1;
            state.generation
        };
        let mut entries = vec![
            (ACCESS_TOKEN_KEY, tokens.access_token.as_str()),
            (REFRESH_TOKEN_KEY, tokens.refresh_token.as_str()),
        ];
        if let Some(id) = &farmer_id {
            entries.push((FARMER_ID_KEY, id.as_str()));
        }
        self.store.set_many(&entries).await?;
        Ok(generation)
    }

    /// Sends a request without credentials (login, OTP verification)
    pub(crate) async fn send_unauthenticated(
        &self,
        method: HttpMethod,
        path: &str,
        body: Value,
    ) -> Result<Value, ApiError> {
        let body = RequestBody::Json(body);
        let response = self
            .execute_with_retry(method, path, &body, None, Uuid::new_v4())
            .await?;
        finish(method, path, response)
    }

    async fn ensure_loaded(&self) -> Result<(), ApiError> {
        if self.state.read().await.loaded {
            return Ok(());
        }
        let mut state = self.state.write().await;
        if state.loaded {
            return Ok(());
        }
        let access = self.store.get(ACCESS_TOKEN_KEY).await?;
        let refresh = self.store.get(REFRESH_TOKEN_KEY).await?;
        let farmer = self.store.get(FARMER_ID_KEY).await?;

        state.tokens = match (access, refresh) {
            (Some(access), Some(refresh)) => Some(TokenPair::new(access, refresh)),
            _ => None,
        };
        state.farmer_id = farmer.and_then(|id| FarmerId::new(id).ok());
        state.loaded = true;
        debug!(authenticated = state.tokens.is_some(), "Loaded stored credentials");
        Ok(())
    }

    async fn current_access(&self) -> Result<(String, u64), ApiError> {
        self.ensure_loaded().await?;
        let skew = Duration::seconds(self.config.refresh_skew_secs);
        let (token, generation, expiring) = {
            let state = self.state.read().await;
            let Some(tokens) = state.tokens.as_ref() else {
                return Err(ApiError::SessionExpired);
            };
            (
                tokens.access_token.clone(),
                state.generation,
                tokens.expires_within(Utc::now(), skew),
            )
        };

        if !expiring {
            return Ok((token, generation));
        }

        debug!("Access token near expiry, refreshing before request");
        match self.refresh_serialized(generation).await {
            Ok(fresh) => Ok(fresh),
            Err(ApiError::SessionExpired) => Err(ApiError::SessionExpired),
            Err(e) => {
                warn!(error = %e, "Early refresh failed, sending with current token");
                Ok((token, generation))
            }
        }
    }

    async fn send_authenticated(
        &self,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
    ) -> Result<Value, ApiError> {
        let request_id = Uuid::new_v4();
        let (token, generation) = self.current_access().await?;

        let response = self
            .execute_with_retry(method, path, &body, Some(&token), request_id)
            .await?;
        if response.status != 401 {
            return finish(method, path, response);
        }

        warn!(%method, path, %request_id, "Access token rejected, refreshing");
        let (token, _) = self.refresh_serialized(generation).await?;

        let replay = self
            .execute_with_retry(method, path, &body, Some(&token), request_id)
            .await?;
        if replay.status == 401 {
            warn!(%method, path, %request_id, "Replay rejected after refresh, ending session");
            if let Err(e) = self.clear_session().await {
                warn!(error = %e, "Failed to clear stored credentials");
            }
            return Err(ApiError::SessionExpired);
        }
        finish(method, path, replay)
    }

    /// Refreshes unless another caller already rotated the pair past `seen_generation`
    async fn refresh_serialized(&self, seen_generation: u64) -> Result<(String, u64), ApiError> {
        let _guard = self.refresh_guard.lock().await;
        {
            let state = self.state.read().await;
            if state.generation != seen_generation {
                debug!("Token pair already rotated by a concurrent caller");
                return state
                    .tokens
                    .as_ref()
                    .map(|tokens| (tokens.access_token.clone(), state.generation))
                    .ok_or(ApiError::SessionExpired);
            }
        }
        self.perform_refresh().await
    }

    async fn perform_refresh(&self) -> Result<(String, u64), ApiError> {
        let refresh_token = {
            let state = self.state.read().await;
            match state.tokens.as_ref() {
                Some(tokens) => tokens.refresh_token.clone(),
                None => return Err(ApiError::SessionExpired),
            }
        };

        info!("Refreshing access token");
        let body = RequestBody::Json(json!({ "refresh_token": refresh_token }));
        let response = self
            .execute_with_retry(HttpMethod::Post, REFRESH_PATH, &body, None, Uuid::new_v4())
            .await?;

        if (400..500).contains(&response.status) {
            warn!(status = response.status, "Token refresh rejected, ending session");
            if let Err(e) = self.clear_session().await {
                warn!(error = %e, "Failed to clear stored credentials");
            }
            return Err(ApiError::SessionExpired);
        }
        if !response.is_success() {
            return Err(ApiError::connection(format!(
                "token refresh failed with status {}",
                response.status
            )));
        }

        let refreshed: RefreshResponse =
            envelope::from_value(envelope::decode_body(&response.body)?)?;
        let pair = TokenPair::new(
            refreshed.access_token,
            refreshed.refresh_token.unwrap_or(refresh_token),
        );
        let access = pair.access_token.clone();

        let generation = match self.store_tokens(pair, None).await {
            Ok(generation) => generation,
            Err(e) => {
                warn!(error = %e, "Refreshed tokens could not be persisted");
                self.state.read().await.generation
            }
        };
        info!(generation, "Access token refreshed");
        Ok((access, generation))
    }

    async fn execute_with_retry(
        &self,
        method: HttpMethod,
        path: &str,
        body: &RequestBody,
        token: Option<&str>,
        request_id: Uuid,
    ) -> Result<HttpResponse, ApiError> {
        let mut attempt = 1;
        loop {
            let request = self.build_request(method, path, body, token, request_id);
            let response = self.dispatch(request).await?;
            debug!(%method, path, %request_id, attempt, status = response.status, "Response received");

            if !self.retry.is_transient_status(response.status) {
                return Ok(response);
            }
            if attempt >= self.retry.max_attempts {
                warn!(%method, path, %request_id, attempt, status = response.status, "Retries exhausted");
                return Err(ApiError::connection(format!(
                    "server unavailable (status {}) after {} attempts",
                    response.status, attempt
                )));
            }

            let delay = self.retry.delay_for_attempt(attempt);
            debug!(%method, path, attempt, delay_ms = delay.as_millis() as u64, "Transient failure, backing off");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: &RequestBody,
        token: Option<&str>,
        request_id: Uuid,
    ) -> HttpRequest {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("X-Request-Id".to_string(), request_id.to_string()),
        ];
        if let Some(token) = token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }
        HttpRequest {
            method,
            url: self.config.url(path),
            headers,
            body: body.clone(),
            timeout: self.config.timeout(),
        }
    }

    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let timeout = request.timeout;
        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(ApiError::connection(format!(
                "request timed out after {}s",
                timeout.as_secs()
            ))),
        }
    }
}

fn finish(method: HttpMethod, path: &str, response: HttpResponse) -> Result<Value, ApiError> {
    if response.is_success() {
        return envelope::decode_body(&response.body);
    }
    let message = envelope::error_message(response.status, &response.body);
    debug!(%method, path, status = response.status, %message, "Request rejected");
    Err(ApiError::rejected(response.status, message))
}

#[async_trait]
impl HealthCheckable for ApiClient {
    /// Pings the backend; the first ping after idle also wakes it
    async fn health_check(&self) -> HealthCheckResult {
        let body = RequestBody::Empty;
        let outcome = self
            .execute_with_retry(HttpMethod::Get, HEALTH_PATH, &body, None, Uuid::new_v4())
            .await;

        let (status, message) = match outcome {
            Ok(response) if response.is_success() => (AdapterHealth::Healthy, None),
            Ok(response) => (
                AdapterHealth::Degraded,
                Some(format!("health endpoint answered {}", response.status)),
            ),
            Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
        };

        HealthCheckResult {
            adapter_id: "claims-api".to_string(),
            status,
            message,
            checked_at: Utc::now(),
        }
    }
}
