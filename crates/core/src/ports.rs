//! Record store port
//!
//! The single seam between the gateway's services and the remote store. The
//! REST adapter in `trackgate-infra` implements this; tests substitute
//! in-memory mocks.

use async_trait::async_trait;
use serde_json::Value;
use trackgate_domain::{FieldMap, QueryResult, Result};

/// Operations the gateway needs from the remote record store.
///
/// Implementations own credential handling (including the single retry after
/// a rejected token); callers only ever see the typed error taxonomy.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Run a SOQL query and return the matching records
    async fn query(&self, soql: &str) -> Result<QueryResult>;

    /// Fetch one record by id, optionally restricted to the given fields
    async fn get_record(
        &self,
        sobject: &str,
        record_id: &str,
        fields: Option<&[&str]>,
    ) -> Result<FieldMap>;

    /// Create a record and return its new id
    async fn create_record(&self, sobject: &str, body: &Value) -> Result<String>;

    /// Apply a partial update; only the supplied fields are sent
    async fn update_record(&self, sobject: &str, record_id: &str, body: &Value) -> Result<()>;
}
