//! Salesforce REST adapters
//!
//! [`auth`] owns the bearer credential lifecycle; [`client`] implements the
//! core [`RecordStore`](trackgate_core::ports::RecordStore) port on top of
//! the REST subset the gateway consumes.

use async_trait::async_trait;
use trackgate_domain::Result;

pub mod auth;
pub mod client;

/// Provides bearer tokens for remote store calls.
///
/// The client depends on this trait rather than the concrete credential
/// manager so tests can substitute canned tokens.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Retrieve a token, acquiring or refreshing as needed
    async fn access_token(&self) -> Result<String>;

    /// Drop the cached token; the next call re-acquires
    async fn invalidate(&self);
}
