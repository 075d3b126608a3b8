//! Gateway configuration model
//!
//! All connection settings are required at startup; a missing value is a
//! fatal configuration error when the context is constructed, never a
//! per-call failure. Loading (environment first, file fallback) lives in
//! `trackgate-infra::config`.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CREATE_WINDOW_SECONDS, DEFAULT_HTTP_TIMEOUT_SECONDS, MAX_CREATES_PER_WINDOW,
};

/// Salesforce connection and identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesforceConfig {
    /// Connected-app client id for the client-credentials exchange
    pub client_id: String,
    /// Connected-app client secret
    pub client_secret: String,
    /// Instance base URL, e.g. `https://example.my.salesforce.com`
    pub instance_url: String,
    /// Email of the operator the gateway acts as; resolved to a role once
    /// per process
    pub user_email: String,
    /// Optional email granted update rights equal to an administrator
    #[serde(default)]
    pub manager_email: Option<String>,
}

/// Rate-limit settings for record-creation operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_creates_per_window: usize,
    pub window_seconds: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_creates_per_window: MAX_CREATES_PER_WINDOW, window_seconds: CREATE_WINDOW_SECONDS }
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Finite timeout applied to every remote call
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS }
    }
}

/// Top-level gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub salesforce: SalesforceConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl SalesforceConfig {
    /// Instance URL without a trailing slash, safe to join paths onto
    pub fn base_url(&self) -> &str {
        self.instance_url.trim_end_matches('/')
    }

    /// Whether the given email matches the configured manager override
    pub fn is_manager(&self, email: &str) -> bool {
        self.manager_email
            .as_deref()
            .is_some_and(|m| m.trim().eq_ignore_ascii_case(email.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SalesforceConfig {
        SalesforceConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            instance_url: "https://example.my.salesforce.com/".into(),
            user_email: "cde@example.com".into(),
            manager_email: Some("Manager@Example.com".into()),
        }
    }

    #[test]
    fn base_url_strips_trailing_slash() {
        assert_eq!(sample().base_url(), "https://example.my.salesforce.com");
    }

    #[test]
    fn manager_match_is_case_insensitive() {
        let config = sample();
        assert!(config.is_manager("manager@example.com"));
        assert!(!config.is_manager("someone@example.com"));
    }

    #[test]
    fn manager_unset_matches_nobody() {
        let config = SalesforceConfig { manager_email: None, ..sample() };
        assert!(!config.is_manager("manager@example.com"));
    }

    #[test]
    fn limits_default_to_documented_ceiling() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.max_creates_per_window, 5);
        assert_eq!(limits.window_seconds, 60);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let toml = r#"
[salesforce]
client_id = "id"
client_secret = "secret"
instance_url = "https://example.my.salesforce.com"
user_email = "cde@example.com"
"#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.http.timeout_seconds, 30);
        assert!(config.salesforce.manager_email.is_none());
    }
}
