//! Conversions from external library errors into domain errors.
//!
//! Raw reqwest errors never cross the gateway boundary; everything is
//! folded into the typed taxonomy here, at the edge.

use reqwest::Error as HttpError;
use trackgate_domain::GatewayError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GatewayError);

impl From<InfraError> for GatewayError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GatewayError> for InfraError {
    fn from(value: GatewayError) -> Self {
        InfraError(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let converted = if err.is_timeout() {
            GatewayError::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            GatewayError::Transport(format!("connection failed: {err}"))
        } else if err.is_decode() {
            GatewayError::Internal(format!("failed to decode remote response: {err}"))
        } else if err.is_builder() {
            GatewayError::Internal(format!("failed to build request: {err}"))
        } else {
            GatewayError::Transport(format!("http error: {err}"))
        };
        InfraError(converted)
    }
}
