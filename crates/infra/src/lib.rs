//! # TrackGate Infra
//!
//! Adapters behind the core ports:
//! - [`salesforce`]: the REST record store and the credential manager
//! - [`http`]: thin reqwest wrapper with a finite timeout (no retries; the
//!   only retry anywhere is the single re-dispatch after a rejected token)
//! - [`config`]: environment-first configuration loading
//! - [`errors`]: conversions from library errors into the domain taxonomy

pub mod config;
pub mod errors;
pub mod http;
pub mod salesforce;

pub use errors::InfraError;
pub use http::HttpClient;
pub use salesforce::auth::CredentialManager;
pub use salesforce::client::SalesforceClient;
pub use salesforce::AccessTokenProvider;
