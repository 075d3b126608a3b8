//! # TrackGate Domain
//!
//! Domain types shared by every TrackGate crate: the error taxonomy, the
//! configuration model, the Salesforce record shapes, and the picklist
//! vocabularies the gateway validates against.
//!
//! This crate is dependency-light by design; anything that talks to the
//! network or the environment lives in `trackgate-infra`.

pub mod constants;
pub mod errors;
pub mod types;

pub use errors::{GatewayError, Result};
pub use types::config::{GatewayConfig, HttpConfig, LimitsConfig, SalesforceConfig};
pub use types::{FieldMap, QueryResult, ResolvedUser, Role};
