//! Implementation record operations
//!
//! Create / update / get / query on the primary `Implementation__c` record.
//! Each operation follows the same sequence: validate locally, (update)
//! enforce access, (create) enforce the rate limit, then build the remote
//! request and translate the outcome. Token handling and error translation
//! live behind the [`RecordStore`] port.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use trackgate_common::resilience::SlidingWindow;
use trackgate_domain::constants::{
    DEFAULT_IMPLEMENTATION_STAGE, DEFAULT_PROGRAM_HEALTH, IMPLEMENTATION_DETAIL_FIELDS,
    SOBJECT_IMPLEMENTATION,
};
use trackgate_domain::types::record::ImplementationRecord;
use trackgate_domain::{FieldMap, GatewayError, QueryResult, Result};

use crate::access::AccessControl;
use crate::ports::RecordStore;
use crate::queries::{escape_soql_literal, QuerySelection};
use crate::validation::{
    prepare_implementation_payload, validate_implementation_field, validate_implementation_fields,
};

/// Request to create a new implementation from an opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewImplementation {
    /// Salesforce Opportunity id the implementation is created from
    pub opportunity_id: String,
    /// `Type__c` picklist value
    pub implementation_type: String,
    /// `Contract_Type__c` picklist value
    pub contract_type: String,
    pub contracted_hours: Option<f64>,
    /// `;`-separated `Features__c` multipicklist value
    pub features: Option<String>,
    pub migration_type: Option<String>,
}

/// Outcome of a successful create
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedImplementation {
    pub record_id: String,
    pub name: String,
    pub account_name: String,
    pub implementation_type: String,
    pub contract_type: String,
    pub stage: String,
    pub health: String,
}

/// Outcome of a successful partial update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedImplementation {
    pub record_id: String,
    /// Field names actually sent (after computed-field stripping)
    pub updated_fields: Vec<String>,
}

/// Service for the four implementation-record operations
pub struct ImplementationService {
    store: Arc<dyn RecordStore>,
    access: Arc<AccessControl>,
    create_limiter: SlidingWindow,
}

impl ImplementationService {
    /// The limiter is shared with [`crate::hours::HoursService`] (clones
    /// share one window): both operations create records remotely.
    pub fn new(
        store: Arc<dyn RecordStore>,
        access: Arc<AccessControl>,
        create_limiter: SlidingWindow,
    ) -> Self {
        Self { store, access, create_limiter }
    }

    /// Create an implementation from an opportunity.
    ///
    /// Reads the opportunity first to source the account linkage and naming
    /// inputs, derives the record name deterministically from the current
    /// date, applies the kickoff defaults, then issues the create.
    /// Unrestricted by role; bounded by the creation rate limit.
    pub async fn create(&self, request: NewImplementation) -> Result<CreatedImplementation> {
        self.validate_new(&request)?;

        if !self.create_limiter.try_acquire() {
            return Err(rate_limited_error(&self.create_limiter));
        }

        let soql = format!(
            "SELECT Id, Name, AccountId, Account.Name, Amount, OwnerId \
             FROM Opportunity WHERE Id = '{}'",
            escape_soql_literal(request.opportunity_id.trim())
        );
        let result = self.store.query(&soql).await?;
        let Some(opportunity) = result.records.first() else {
            return Err(GatewayError::NotFound(format!(
                "no Opportunity found with ID: {}",
                request.opportunity_id
            )));
        };

        let account_id =
            opportunity.get("AccountId").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let account_name = opportunity
            .get("Account")
            .and_then(|v| v.get("Name"))
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string();

        let today = chrono::Local::now().date_naive();
        let name = derive_implementation_name(&account_name, &request.implementation_type, today);

        let mut payload = json!({
            "Name": name,
            "Opportunity__c": request.opportunity_id.trim(),
            "Account__c": account_id,
            "Type__c": request.implementation_type,
            "Contract_Type__c": request.contract_type,
            "Implementation_Stage__c": DEFAULT_IMPLEMENTATION_STAGE,
            "Program_Health__c": DEFAULT_PROGRAM_HEALTH,
            "In_Production__c": false,
        });
        if let Some(hours) = request.contracted_hours {
            payload["Contracted_Hours__c"] = json!(hours);
        }
        if let Some(features) = &request.features {
            payload["Features__c"] = json!(features);
        }
        if let Some(migration_type) = &request.migration_type {
            payload["Migration_Type__c"] = json!(migration_type);
        }

        let record_id = self.store.create_record(SOBJECT_IMPLEMENTATION, &payload).await?;
        info!(record_id = %record_id, name = %name, "created implementation");

        Ok(CreatedImplementation {
            record_id,
            name,
            account_name,
            implementation_type: request.implementation_type,
            contract_type: request.contract_type,
            stage: DEFAULT_IMPLEMENTATION_STAGE.to_string(),
            health: DEFAULT_PROGRAM_HEALTH.to_string(),
        })
    }

    /// Partially update an implementation.
    ///
    /// Resolves a name to an id if needed, authorizes the caller (ownership
    /// gate for standard roles), validates every supplied field, strips
    /// remote-computed fields, and sends only what remains.
    pub async fn update(
        &self,
        name_or_id: &str,
        fields: FieldMap,
    ) -> Result<UpdatedImplementation> {
        let record_id = resolve_implementation_id(self.store.as_ref(), name_or_id).await?;

        self.access.authorize_update(&record_id).await?;
        validate_implementation_fields(&fields)?;

        let supplied: Vec<String> = fields.keys().cloned().collect();
        let payload = prepare_implementation_payload(fields);
        if payload.is_empty() {
            return Err(GatewayError::validation(
                supplied,
                "no updatable fields supplied; remote-computed fields cannot be written",
            ));
        }

        let updated_fields: Vec<String> = payload.keys().cloned().collect();
        self.store
            .update_record(SOBJECT_IMPLEMENTATION, &record_id, &Value::Object(payload))
            .await?;
        info!(record_id = %record_id, fields = ?updated_fields, "updated implementation");

        Ok(UpdatedImplementation { record_id, updated_fields })
    }

    /// Fetch the full documented field set of one implementation
    pub async fn get(&self, name_or_id: &str) -> Result<ImplementationRecord> {
        let record_id = resolve_implementation_id(self.store.as_ref(), name_or_id).await?;
        let map = self
            .store
            .get_record(SOBJECT_IMPLEMENTATION, &record_id, Some(IMPLEMENTATION_DETAIL_FIELDS))
            .await?;
        ImplementationRecord::from_field_map(map)
    }

    /// Run a preset or custom query. Unrestricted by role and not rate
    /// limited (reads are idempotent).
    pub async fn query(&self, selection: &QuerySelection) -> Result<QueryResult> {
        self.store.query(selection.soql()).await
    }

    /// Validate the enumerated create inputs, reporting every offender
    fn validate_new(&self, request: &NewImplementation) -> Result<()> {
        let mut checks = vec![
            ("Type__c", json!(request.implementation_type)),
            ("Contract_Type__c", json!(request.contract_type)),
        ];
        if let Some(features) = &request.features {
            checks.push(("Features__c", json!(features)));
        }
        if let Some(migration_type) = &request.migration_type {
            checks.push(("Migration_Type__c", json!(migration_type)));
        }

        let mut offenders = Vec::new();
        let mut messages = Vec::new();
        for (field, value) in &checks {
            if let Err(message) = validate_implementation_field(field, value) {
                offenders.push((*field).to_string());
                messages.push(message);
            }
        }

        if offenders.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Validation { fields: offenders, message: messages.join("; ") })
        }
    }
}

/// Derive the record name: `{account_name} - {type} - {YYYY-MM-DD}`
pub fn derive_implementation_name(
    account_name: &str,
    implementation_type: &str,
    date: NaiveDate,
) -> String {
    format!("{account_name} - {implementation_type} - {date}")
}

/// Translate a full limiter into the typed rate-limit outcome
pub(crate) fn rate_limited_error(limiter: &SlidingWindow) -> GatewayError {
    let retry_after_secs = limiter
        .retry_after()
        .map(|d| {
            let secs = d.as_secs();
            if d.subsec_nanos() > 0 {
                secs + 1
            } else {
                secs
            }
        })
        .unwrap_or(0);
    warn!(retry_after_secs, "creation rate limit reached");
    GatewayError::RateLimited { retry_after_secs }
}

/// Resolve an implementation name (e.g. `IMPL-0042`) or id to a record id.
///
/// Ids pass through untouched; anything else is looked up by exact name
/// match. Zero matches is `NotFound`; more than one is a validation error —
/// an ambiguous name must not silently pick a record.
pub async fn resolve_implementation_id(store: &dyn RecordStore, name_or_id: &str) -> Result<String> {
    let trimmed = name_or_id.trim();
    if looks_like_record_id(trimmed) {
        return Ok(trimmed.to_string());
    }

    let soql = format!(
        "SELECT Id FROM Implementation__c WHERE Name = '{}' LIMIT 2",
        escape_soql_literal(trimmed)
    );
    let result = store.query(&soql).await?;
    match result.records.len() {
        0 => Err(GatewayError::NotFound(format!(
            "no Implementation record found with name: {trimmed}"
        ))),
        1 => result.records[0]
            .get("Id")
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| GatewayError::Internal("name lookup returned a record without Id".into())),
        _ => Err(GatewayError::validation(
            ["record_name_or_id"],
            format!("implementation name '{trimmed}' matches more than one record; use the record id"),
        )),
    }
}

/// Implementation ids are 15 or 18 alphanumeric chars with the custom-object
/// `a0` prefix
fn looks_like_record_id(value: &str) -> bool {
    matches!(value.len(), 15 | 18)
        && value[..2].eq_ignore_ascii_case("a0")
        && value.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use trackgate_domain::SalesforceConfig;

    use super::*;

    /// Configurable in-memory store that records every mutation
    struct MockStore {
        user: Value,
        opportunity: Option<Value>,
        name_matches: Vec<Value>,
        record: FieldMap,
        queries: Mutex<Vec<String>>,
        created: Mutex<Vec<(String, Value)>>,
        updated: Mutex<Vec<(String, String, Value)>>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                user: json!({"Id": "005ADMIN0000001", "Profile": {"Name": "System Administrator"}}),
                opportunity: Some(json!({
                    "Id": "006OPP000000001",
                    "Name": "Acme Expansion",
                    "AccountId": "001ACC000000001",
                    "Account": {"Name": "Acme Corp"},
                    "Amount": 120000.0,
                    "OwnerId": "005OWN000000001"
                })),
                name_matches: vec![json!({"Id": "a0B000000000001"})],
                record: json!({
                    "Id": "a0B000000000001",
                    "Name": "IMPL-0042",
                    "Implementation_Stage__c": "03 - In Progress",
                    "CDE__c": "005ADMIN0000001"
                })
                .as_object()
                .unwrap()
                .clone(),
                queries: Mutex::new(Vec::new()),
                created: Mutex::new(Vec::new()),
                updated: Mutex::new(Vec::new()),
            }
        }

        fn standard_user(mut self) -> Self {
            self.user = json!({"Id": "005STD000000001", "Profile": {"Name": "Standard User"}});
            self
        }

        fn owned_by(mut self, cde: &str) -> Self {
            self.record.insert("CDE__c".into(), json!(cde));
            self
        }

        fn created_count(&self) -> usize {
            self.created.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RecordStore for MockStore {
        async fn query(&self, soql: &str) -> Result<QueryResult> {
            self.queries.lock().unwrap().push(soql.to_string());
            let records: Vec<FieldMap> = if soql.contains("FROM User") {
                vec![self.user.as_object().unwrap().clone()]
            } else if soql.contains("FROM Opportunity") {
                self.opportunity
                    .iter()
                    .map(|o| o.as_object().unwrap().clone())
                    .collect()
            } else if soql.contains("WHERE Name =") {
                self.name_matches.iter().map(|r| r.as_object().unwrap().clone()).collect()
            } else {
                vec![self.record.clone()]
            };
            Ok(QueryResult { total_size: records.len() as u64, records })
        }

        async fn get_record(
            &self,
            _sobject: &str,
            _record_id: &str,
            _fields: Option<&[&str]>,
        ) -> Result<FieldMap> {
            Ok(self.record.clone())
        }

        async fn create_record(&self, sobject: &str, body: &Value) -> Result<String> {
            self.created.lock().unwrap().push((sobject.to_string(), body.clone()));
            Ok("a0B00000000NEW1".to_string())
        }

        async fn update_record(&self, sobject: &str, record_id: &str, body: &Value) -> Result<()> {
            self.updated
                .lock()
                .unwrap()
                .push((sobject.to_string(), record_id.to_string(), body.clone()));
            Ok(())
        }
    }

    fn config() -> SalesforceConfig {
        SalesforceConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            instance_url: "https://example.my.salesforce.com".into(),
            user_email: "cde@example.com".into(),
            manager_email: None,
        }
    }

    fn service(store: Arc<MockStore>) -> ImplementationService {
        let access = Arc::new(AccessControl::new(store.clone(), &config()));
        let limiter = SlidingWindow::new(Default::default()).unwrap();
        ImplementationService::new(store, access, limiter)
    }

    fn new_request() -> NewImplementation {
        NewImplementation {
            opportunity_id: "006OPP000000001".into(),
            implementation_type: "Join".into(),
            contract_type: "Annual".into(),
            contracted_hours: Some(40.0),
            features: Some("Compression;Hypertables".into()),
            migration_type: None,
        }
    }

    #[test]
    fn derives_name_from_account_type_and_date() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        assert_eq!(
            derive_implementation_name("Acme Corp", "Join", date),
            "Acme Corp - Join - 2026-02-27"
        );
    }

    #[tokio::test]
    async fn create_applies_defaults_and_derived_name() {
        let store = Arc::new(MockStore::new());
        let svc = service(store.clone());

        let created = svc.create(new_request()).await.unwrap();

        assert_eq!(created.record_id, "a0B00000000NEW1");
        assert_eq!(created.account_name, "Acme Corp");
        let today = chrono::Local::now().date_naive();
        assert_eq!(created.name, format!("Acme Corp - Join - {today}"));

        let created_calls = store.created.lock().unwrap();
        let (sobject, body) = &created_calls[0];
        assert_eq!(sobject, SOBJECT_IMPLEMENTATION);
        assert_eq!(body["Implementation_Stage__c"], "00 - Kick Off Call");
        assert_eq!(body["Program_Health__c"], "Healthy");
        assert_eq!(body["In_Production__c"], false);
        assert_eq!(body["Contracted_Hours__c"], 40.0);
        assert_eq!(body["Features__c"], "Compression;Hypertables");
    }

    #[tokio::test]
    async fn create_rejects_invalid_picklists_before_any_remote_call() {
        let store = Arc::new(MockStore::new());
        let svc = service(store.clone());

        let mut request = new_request();
        request.implementation_type = "Sideways".into();
        request.contract_type = "Handshake".into();

        let err = svc.create(request).await.unwrap_err();
        match err {
            GatewayError::Validation { fields, .. } => {
                assert!(fields.contains(&"Type__c".to_string()));
                assert!(fields.contains(&"Contract_Type__c".to_string()));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.queries.lock().unwrap().is_empty());
        assert_eq!(store.created_count(), 0);
    }

    #[tokio::test]
    async fn create_missing_opportunity_is_not_found() {
        let store = Arc::new(MockStore { opportunity: None, ..MockStore::new() });
        let svc = service(store.clone());

        let err = svc.create(new_request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
        assert_eq!(store.created_count(), 0);
    }

    #[tokio::test]
    async fn sixth_create_in_window_is_rate_limited() {
        let store = Arc::new(MockStore::new());
        let svc = service(store.clone());

        for _ in 0..5 {
            svc.create(new_request()).await.unwrap();
        }
        let err = svc.create(new_request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::RateLimited { .. }));
        assert_eq!(store.created_count(), 5);
    }

    #[tokio::test]
    async fn update_patches_only_supplied_fields() {
        let store = Arc::new(MockStore::new());
        let svc = service(store.clone());

        let mut fields = FieldMap::new();
        fields.insert("Program_Health__c".into(), json!("Risk"));
        fields.insert("Comments__c".into(), json!("slipping"));

        let mut outcome = svc.update("a0B000000000001", fields).await.unwrap();
        outcome.updated_fields.sort();
        assert_eq!(outcome.updated_fields, vec!["Comments__c", "Program_Health__c"]);

        let updated = store.updated.lock().unwrap();
        let (_, record_id, body) = &updated[0];
        assert_eq!(record_id, "a0B000000000001");
        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_by_non_owner_is_denied_with_no_patch() {
        let store =
            Arc::new(MockStore::new().standard_user().owned_by("005SOMEONEELSE1"));
        let svc = service(store.clone());

        let mut fields = FieldMap::new();
        fields.insert("Comments__c".into(), json!("attempt"));

        let err = svc.update("a0B000000000001", fields).await.unwrap_err();
        assert!(matches!(err, GatewayError::Authorization(_)));
        assert!(store.updated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_by_owner_succeeds() {
        let store = Arc::new(MockStore::new().standard_user().owned_by("005STD000000001"));
        let svc = service(store.clone());

        let mut fields = FieldMap::new();
        fields.insert("Implementation_Stage__c".into(), json!("04 - Final Review"));

        svc.update("a0B000000000001", fields).await.unwrap();
        assert_eq!(store.updated.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_strips_computed_fields_and_errors_when_nothing_remains() {
        let store = Arc::new(MockStore::new());
        let svc = service(store.clone());

        let mut fields = FieldMap::new();
        fields.insert("Comments__c".into(), json!("kept"));
        fields.insert("Stale_Days__c".into(), json!(20));
        let outcome = svc.update("a0B000000000001", fields).await.unwrap();
        assert_eq!(outcome.updated_fields, vec!["Comments__c"]);

        let mut only_computed = FieldMap::new();
        only_computed.insert("Stale_Days__c".into(), json!(20));
        let err = svc.update("a0B000000000001", only_computed).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
        assert_eq!(store.updated.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_aggregates_every_invalid_field() {
        let store = Arc::new(MockStore::new());
        let svc = service(store);

        let mut fields = FieldMap::new();
        fields.insert("Type__c".into(), json!("Sideways"));
        fields.insert("Next_Step_Date__c".into(), json!("tomorrow"));

        let err = svc.update("a0B000000000001", fields).await.unwrap_err();
        match err {
            GatewayError::Validation { mut fields, .. } => {
                fields.sort();
                assert_eq!(fields, vec!["Next_Step_Date__c", "Type__c"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolve_passes_ids_through_without_a_lookup() {
        let store = MockStore::new();
        let id = resolve_implementation_id(&store, " a0B000000000001 ").await.unwrap();
        assert_eq!(id, "a0B000000000001");
        assert!(store.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_looks_up_names_exactly() {
        let store = MockStore::new();
        let id = resolve_implementation_id(&store, "IMPL-0042").await.unwrap();
        assert_eq!(id, "a0B000000000001");
        let queries = store.queries.lock().unwrap();
        assert!(queries[0].contains("WHERE Name = 'IMPL-0042'"));
    }

    #[tokio::test]
    async fn resolve_zero_matches_is_not_found() {
        let store = MockStore { name_matches: vec![], ..MockStore::new() };
        let err = resolve_implementation_id(&store, "IMPL-9999").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn resolve_ambiguous_name_is_a_typed_error() {
        let store = MockStore {
            name_matches: vec![json!({"Id": "a0B000000000001"}), json!({"Id": "a0B000000000002"})],
            ..MockStore::new()
        };
        let err = resolve_implementation_id(&store, "IMPL-0042").await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[tokio::test]
    async fn get_returns_typed_record() {
        let store = Arc::new(MockStore::new());
        let svc = service(store);

        let record = svc.get("IMPL-0042").await.unwrap();
        assert_eq!(record.name.as_deref(), Some("IMPL-0042"));
        assert_eq!(record.stage.as_deref(), Some("03 - In Progress"));
    }

    #[tokio::test]
    async fn query_dispatches_preset_soql() {
        let store = Arc::new(MockStore::new());
        let svc = service(store.clone());

        let selection = QuerySelection::parse("at_risk", None).unwrap();
        svc.query(&selection).await.unwrap();

        let queries = store.queries.lock().unwrap();
        // First query resolves nothing here; the preset goes straight out
        assert!(queries.iter().any(|q| q.contains("Program_Health__c IN ('Risk', 'High Risk', 'Churn')")));
    }
}
