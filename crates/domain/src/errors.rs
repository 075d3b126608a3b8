//! Error types used throughout the gateway
//!
//! Every failure that crosses the gateway boundary is one of these typed
//! outcomes; raw transport or library errors are converted in
//! `trackgate-infra` and never surface to callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for TrackGate
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum GatewayError {
    /// Missing or malformed startup configuration (fatal at process start)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token acquisition or refresh failed against the remote auth endpoint
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The configured caller identity could not be resolved to a role
    #[error("Identity error: {0}")]
    Identity(String),

    /// Local field validation failed, or the remote store rejected fields
    #[error("Validation failed for {}: {message}", .fields.join(", "))]
    Validation {
        /// Every offending field, not just the first
        fields: Vec<String>,
        message: String,
    },

    /// The record-creation rate ceiling was reached
    #[error("Rate limit reached: retry in about {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The caller's role does not permit the requested mutation
    #[error("Access denied: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure or timeout talking to the remote store
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Build a [`GatewayError::Validation`] from offending fields and a message
    pub fn validation(fields: impl IntoIterator<Item = impl Into<String>>, message: impl Into<String>) -> Self {
        Self::Validation {
            fields: fields.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
