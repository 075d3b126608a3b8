//! Common data types used throughout the gateway

pub mod config;
pub mod hours;
pub mod record;

use serde::{Deserialize, Serialize};

/// Raw field map exchanged with the remote store.
///
/// Callers supply updates as a field map keyed by Salesforce API names;
/// internally the gateway converts reads into typed records
/// ([`record::ImplementationRecord`]) and keeps this alias as the
/// pass-through escape hatch for forward compatibility.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Role resolved for the configured caller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Standard,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

/// Caller identity resolved against the remote store's User object.
///
/// Resolved once per process and cached; invalidated only by restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedUser {
    pub user_id: String,
    pub profile_name: String,
    pub role: Role,
}

/// Result of a SOQL query against the remote store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "totalSize", default)]
    pub total_size: u64,
    #[serde(default)]
    pub records: Vec<FieldMap>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_admin_check() {
        assert!(Role::Administrator.is_admin());
        assert!(!Role::Standard.is_admin());
    }

    #[test]
    fn query_result_deserializes_salesforce_shape() {
        let json = r#"{
            "totalSize": 1,
            "done": true,
            "records": [
                { "attributes": {"type": "Implementation__c"}, "Id": "a0B000000000001", "Name": "IMPL-0042" }
            ]
        }"#;
        let result: QueryResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.total_size, 1);
        assert_eq!(result.records[0]["Name"], "IMPL-0042");
    }

    #[test]
    fn query_result_tolerates_missing_fields() {
        let result: QueryResult = serde_json::from_str("{}").unwrap();
        assert!(result.is_empty());
        assert_eq!(result.total_size, 0);
    }
}
