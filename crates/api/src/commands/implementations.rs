//! Implementation record commands: create, update, get, query

use serde::{Deserialize, Serialize};
use trackgate_core::implementations::NewImplementation;
use trackgate_core::queries::QuerySelection;
use trackgate_domain::types::record::ImplementationRecord;
use trackgate_domain::{FieldMap, Result};

use crate::context::GatewayContext;

/// Arguments for `create_implementation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateImplementationArgs {
    /// The 15 or 18-char Opportunity id (starts with 006)
    pub opportunity_id: String,
    /// Implementation type picklist value (e.g. `Join`, `Pure Migration`)
    #[serde(rename = "type")]
    pub implementation_type: String,
    /// Contract type picklist value (e.g. `Annual`, `Free Trial`)
    pub contract_type: String,
    #[serde(default)]
    pub contracted_hours: Option<f64>,
    /// Optional `;`-separated features (e.g. `Compression;Hypertables`)
    #[serde(default)]
    pub features: Option<String>,
    #[serde(default)]
    pub migration_type: Option<String>,
}

/// Result of `create_implementation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateImplementationResult {
    pub record_id: String,
    pub name: String,
    pub account_name: String,
    pub stage: String,
    pub health: String,
    pub summary: String,
}

/// Create a new implementation record from an opportunity.
///
/// Rate-limited together with `log_hours`; unrestricted by role.
pub async fn create_implementation(
    context: &GatewayContext,
    args: CreateImplementationArgs,
) -> Result<CreateImplementationResult> {
    let created = context
        .implementations
        .create(NewImplementation {
            opportunity_id: args.opportunity_id,
            implementation_type: args.implementation_type,
            contract_type: args.contract_type,
            contracted_hours: args.contracted_hours,
            features: args.features,
            migration_type: args.migration_type,
        })
        .await?;

    let summary = format!(
        "Implementation created successfully.\n  Record ID: {}\n  Name: {}\n  Account: {}\n  \
         Type: {}\n  Contract: {}\n  Stage: {}\n  Health: {}",
        created.record_id,
        created.name,
        created.account_name,
        created.implementation_type,
        created.contract_type,
        created.stage,
        created.health,
    );

    Ok(CreateImplementationResult {
        record_id: created.record_id,
        name: created.name,
        account_name: created.account_name,
        stage: created.stage,
        health: created.health,
        summary,
    })
}

/// Arguments for `update_implementation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateImplementationArgs {
    /// Record name (e.g. `IMPL-0042`) or id
    pub record_name_or_id: String,
    /// Field API names to new values; only supplied fields are sent
    pub updates: FieldMap,
}

/// Result of `update_implementation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateImplementationResult {
    pub record_id: String,
    pub updated_fields: Vec<String>,
    pub summary: String,
}

/// Update fields on an existing implementation.
///
/// Access control: only the assigned CDE, administrators, or the configured
/// manager may update a record.
pub async fn update_implementation(
    context: &GatewayContext,
    args: UpdateImplementationArgs,
) -> Result<UpdateImplementationResult> {
    let outcome =
        context.implementations.update(&args.record_name_or_id, args.updates).await?;

    let summary = format!(
        "Updated {} (ID: {}): {}",
        args.record_name_or_id,
        outcome.record_id,
        outcome.updated_fields.join(", "),
    );

    Ok(UpdateImplementationResult {
        record_id: outcome.record_id,
        updated_fields: outcome.updated_fields,
        summary,
    })
}

/// Arguments for `get_implementation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetImplementationArgs {
    pub record_name_or_id: String,
}

/// Result of `get_implementation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetImplementationResult {
    pub record: ImplementationRecord,
    pub summary: String,
}

/// Fetch the full field set of one implementation
pub async fn get_implementation(
    context: &GatewayContext,
    args: GetImplementationArgs,
) -> Result<GetImplementationResult> {
    let record = context.implementations.get(&args.record_name_or_id).await?;
    let summary = record.summary();
    Ok(GetImplementationResult { record, summary })
}

/// Arguments for `query_implementations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryImplementationsArgs {
    /// One of `at_risk`, `active`, `bandwidth`, `stale`, `by_stage`, or
    /// `custom`
    pub query_type: String,
    /// Required when `query_type` is `custom`; a SELECT-only SOQL query
    #[serde(default)]
    pub custom_soql: Option<String>,
}

/// Result of `query_implementations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryImplementationsResult {
    pub query_type: String,
    pub total: u64,
    pub records: Vec<FieldMap>,
    pub summary: String,
}

/// Run a named preset or custom query over the implementation book.
///
/// Not rate limited and unrestricted by role (reads are idempotent).
pub async fn query_implementations(
    context: &GatewayContext,
    args: QueryImplementationsArgs,
) -> Result<QueryImplementationsResult> {
    let selection = QuerySelection::parse(&args.query_type, args.custom_soql.as_deref())?;
    let result = context.implementations.query(&selection).await?;

    let mut records: Vec<FieldMap> = result.records;
    for record in &mut records {
        record.remove("attributes");
    }

    let summary = render_query_summary(&args.query_type, &records);

    Ok(QueryImplementationsResult {
        query_type: args.query_type,
        total: result.total_size,
        records,
        summary,
    })
}

/// Render query results for the conversational layer
fn render_query_summary(query_type: &str, records: &[FieldMap]) -> String {
    if records.is_empty() {
        return format!("No results found for query type '{query_type}'.");
    }

    if query_type == "by_stage" {
        let mut lines = vec![format!("Implementations by stage ({} groups):", records.len())];
        for record in records {
            let stage = record
                .get("Implementation_Stage__c")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown");
            let count = record.get("total").and_then(|v| v.as_u64()).unwrap_or(0);
            lines.push(format!("  {stage}: {count}"));
        }
        return lines.join("\n");
    }

    let mut lines = vec![format!("Found {} record(s):", records.len())];
    for record in records {
        match ImplementationRecord::from_field_map(record.clone()) {
            Ok(parsed) => {
                lines.push(String::new());
                lines.push(parsed.summary());
            }
            Err(_) => lines.push("  (unreadable record)".to_string()),
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn field_map(value: serde_json::Value) -> FieldMap {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn create_args_accept_the_tool_schema() {
        let args: CreateImplementationArgs = serde_json::from_value(json!({
            "opportunity_id": "006OPP000000001",
            "type": "Join",
            "contract_type": "Annual",
            "features": "Compression;Hypertables"
        }))
        .unwrap();
        assert_eq!(args.implementation_type, "Join");
        assert!(args.contracted_hours.is_none());
    }

    #[test]
    fn query_summary_renders_by_stage_groups() {
        let records = vec![
            field_map(json!({"Implementation_Stage__c": "01 - Explore", "total": 3})),
            field_map(json!({"Implementation_Stage__c": "03 - In Progress", "total": 7})),
        ];
        let summary = render_query_summary("by_stage", &records);
        assert!(summary.contains("01 - Explore: 3"));
        assert!(summary.contains("03 - In Progress: 7"));
    }

    #[test]
    fn query_summary_renders_record_summaries() {
        let records = vec![field_map(json!({
            "Id": "a0B000000000001",
            "Name": "IMPL-0042",
            "Program_Health__c": "Risk"
        }))];
        let summary = render_query_summary("at_risk", &records);
        assert!(summary.starts_with("Found 1 record(s):"));
        assert!(summary.contains("**IMPL-0042**"));
        assert!(summary.contains("Health: Risk"));
    }

    #[test]
    fn query_summary_reports_empty_results() {
        let summary = render_query_summary("stale", &[]);
        assert!(summary.contains("No results found"));
    }
}
