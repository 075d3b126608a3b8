//! Credential manager
//!
//! Acquires a bearer token through the client-credentials exchange and
//! caches it in memory (never persisted). Expiry is tracked as issued-at
//! plus the returned lifetime, with a conservative default when the remote
//! store omits one; a token within the refresh threshold of expiry is
//! treated as already expired and refreshed proactively.
//!
//! Refresh is single-flight: concurrent callers needing a token serialize
//! on a mutex, and losers of the race re-check the cache instead of
//! re-acquiring. Tokens are opaque and never logged.
//!
//! Lifecycle: `Valid → Expired/Rejected → Refreshing → Valid`, where
//! `Rejected` is entered via [`CredentialManager::invalidate`] when the
//! remote store answers 401.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use trackgate_common::time::{Clock, SystemClock};
use trackgate_domain::constants::{
    DEFAULT_TOKEN_LIFETIME_SECONDS, TOKEN_REFRESH_THRESHOLD_SECONDS,
};
use trackgate_domain::{GatewayError, Result, SalesforceConfig};

use crate::http::HttpClient;
use crate::salesforce::AccessTokenProvider;

/// Token endpoint response; the lifetime is optional on purpose
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    acquired_at: Instant,
    lifetime: Duration,
}

impl CachedToken {
    /// A token within `threshold` of expiry counts as expired
    fn is_expired(&self, now: Instant, threshold: Duration) -> bool {
        now.duration_since(self.acquired_at) + threshold >= self.lifetime
    }
}

/// Manages the bearer credential for remote store calls
pub struct CredentialManager<C: Clock = SystemClock> {
    http: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_threshold: Duration,
    cached: RwLock<Option<CachedToken>>,
    /// Guards acquisition so only one refresh is in flight at a time
    refresh_lock: Mutex<()>,
    clock: Arc<C>,
}

impl CredentialManager<SystemClock> {
    pub fn new(http: HttpClient, config: &SalesforceConfig) -> Self {
        Self::with_clock(http, config, Arc::new(SystemClock))
    }
}

impl<C: Clock> CredentialManager<C> {
    /// Create a manager with a custom clock (deterministic expiry in tests)
    pub fn with_clock(http: HttpClient, config: &SalesforceConfig, clock: Arc<C>) -> Self {
        Self {
            http,
            token_url: format!("{}/services/oauth2/token", config.base_url()),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_threshold: Duration::from_secs(TOKEN_REFRESH_THRESHOLD_SECONDS),
            cached: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            clock,
        }
    }

    /// Get a valid token, acquiring or refreshing as needed.
    ///
    /// Idempotent within the token's validity; concurrent callers trigger
    /// at most one acquisition.
    pub async fn get_token(&self) -> Result<String> {
        if let Some(token) = self.cached_valid().await {
            return Ok(token);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = self.cached_valid().await {
            return Ok(token);
        }
        self.acquire().await
    }

    /// Drop the cached token so the next call re-acquires. Called when the
    /// remote store rejects a request with 401.
    pub async fn drop_token(&self) {
        debug!("invalidating cached token");
        *self.cached.write().await = None;
    }

    async fn cached_valid(&self) -> Option<String> {
        let cached = self.cached.read().await;
        cached
            .as_ref()
            .filter(|t| !t.is_expired(self.clock.now(), self.refresh_threshold))
            .map(|t| t.token.clone())
    }

    async fn acquire(&self) -> Result<String> {
        debug!("acquiring bearer token via client-credentials exchange");
        let request = self.http.request(Method::POST, &self.token_url).form(&[
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ]);
        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Auth(format!(
                "token endpoint returned HTTP {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Auth(format!("malformed token response: {e}")))?;

        let lifetime = Duration::from_secs(
            token_response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECONDS),
        );
        let token = token_response.access_token;
        *self.cached.write().await = Some(CachedToken {
            token: token.clone(),
            acquired_at: self.clock.now(),
            lifetime,
        });
        info!(lifetime_secs = lifetime.as_secs(), "authenticated with remote store");
        Ok(token)
    }
}

#[async_trait::async_trait]
impl<C: Clock> AccessTokenProvider for CredentialManager<C> {
    async fn access_token(&self) -> Result<String> {
        self.get_token().await
    }

    async fn invalidate(&self) {
        self.drop_token().await;
    }
}
