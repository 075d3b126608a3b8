//! Gateway context - dependency injection container
//!
//! Holds every service and all cached state (bearer credential, resolved
//! role, rate window). Constructed once per process and torn down at
//! process exit; there are no ambient globals — every operation takes the
//! context explicitly.

use std::sync::Arc;
use std::time::Duration;

use trackgate_common::resilience::{SlidingWindow, SlidingWindowConfig};
use trackgate_core::ports::RecordStore;
use trackgate_core::{AccessControl, HoursService, ImplementationService};
use trackgate_domain::{GatewayConfig, GatewayError, Result};
use trackgate_infra::{config as config_loader, CredentialManager, HttpClient, SalesforceClient};

/// Gateway context - holds all services and dependencies
pub struct GatewayContext {
    pub config: GatewayConfig,
    pub access: Arc<AccessControl>,
    pub implementations: ImplementationService,
    pub hours: HoursService,
}

impl GatewayContext {
    /// Build the context from the process environment.
    ///
    /// Loads `.env` for development convenience, then configuration
    /// (environment first, file fallback). A missing required setting is a
    /// fatal [`GatewayError::Config`] here, before any operation runs.
    pub fn initialize() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!(path = %path.display(), "loaded .env"),
            Err(_) => tracing::debug!("no .env file found"),
        }

        let config = config_loader::load()?;
        Self::with_config(config)
    }

    /// Build the context from an already-loaded configuration
    pub fn with_config(config: GatewayConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.http.timeout_seconds))
            .build()?;

        let credentials = Arc::new(CredentialManager::new(http.clone(), &config.salesforce));
        let store: Arc<dyn RecordStore> =
            Arc::new(SalesforceClient::new(&config.salesforce, http, credentials));

        let access = Arc::new(AccessControl::new(store.clone(), &config.salesforce));

        // One window shared by both record-creating operations
        let limiter = SlidingWindow::new(SlidingWindowConfig::new(
            config.limits.max_creates_per_window,
            Duration::from_secs(config.limits.window_seconds),
        ))
        .map_err(GatewayError::Config)?;

        let implementations =
            ImplementationService::new(store.clone(), access.clone(), limiter.clone());
        let hours = HoursService::new(store, limiter);

        tracing::info!(
            instance = %config.salesforce.base_url(),
            user = %config.salesforce.user_email,
            "gateway context initialized"
        );

        Ok(Self { config, access, implementations, hours })
    }

    /// Resolve the caller identity eagerly so misconfiguration surfaces at
    /// startup instead of on the first privileged call.
    pub async fn warm_up(&self) -> Result<()> {
        self.access.resolve().await.map(|_| ())
    }
}
