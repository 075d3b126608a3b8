//! Configuration loader
//!
//! Loads gateway configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports TOML and JSON formats
//!
//! Missing required settings are a fatal configuration error at process
//! start, never a per-call failure.
//!
//! ## Environment Variables
//! - `SF_CLIENT_ID`: connected-app client id (required)
//! - `SF_CLIENT_SECRET`: connected-app client secret (required)
//! - `SF_INSTANCE_URL`: instance base URL (required)
//! - `SF_USER_EMAIL`: operator email the gateway acts as (required)
//! - `SF_MANAGER_EMAIL`: optional email with admin-equivalent update rights

use std::path::{Path, PathBuf};

use trackgate_domain::{
    GatewayConfig, GatewayError, HttpConfig, LimitsConfig, Result, SalesforceConfig,
};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `GatewayError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<GatewayConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `GatewayError::Config` if any required variable is missing.
pub fn load_from_env() -> Result<GatewayConfig> {
    let client_id = env_var("SF_CLIENT_ID")?;
    let client_secret = env_var("SF_CLIENT_SECRET")?;
    let instance_url = env_var("SF_INSTANCE_URL")?;
    let user_email = env_var("SF_USER_EMAIL")?;
    let manager_email = std::env::var("SF_MANAGER_EMAIL").ok().filter(|v| !v.trim().is_empty());

    Ok(GatewayConfig {
        salesforce: SalesforceConfig {
            client_id,
            client_secret,
            instance_url,
            user_email,
            manager_email,
        },
        limits: LimitsConfig::default(),
        http: HttpConfig::default(),
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected
/// by file extension (`.toml` or `.json`).
///
/// # Errors
/// Returns `GatewayError::Config` when no file is found or parsing fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<GatewayConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GatewayError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GatewayError::Config(
                "missing required environment (SF_CLIENT_ID, SF_CLIENT_SECRET, SF_INSTANCE_URL, \
                 SF_USER_EMAIL) and no config file found in the standard locations"
                    .to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GatewayError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format by extension
fn parse_config(contents: &str, path: &Path) -> Result<GatewayConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("invalid JSON format: {e}"))),
        _ => Err(GatewayError::Config(format!("unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file
///
/// Searches `trackgate.{toml,json}` and `config.{toml,json}` in the current
/// working directory, then its parent.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("trackgate.toml"),
            cwd.join("trackgate.json"),
            cwd.join("config.toml"),
            cwd.join("config.json"),
            cwd.join("../trackgate.toml"),
            cwd.join("../trackgate.json"),
        ]);
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            GatewayError::Config(format!("missing required environment variable: {key}"))
        })
}
