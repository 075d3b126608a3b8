//! Typed view of the primary `Implementation__c` record
//!
//! The remote store accepts and returns flat field maps; internally the
//! gateway maps reads onto this record-of-optional-fields so callers get
//! typed access to the documented fields, with a flattened `extra` map as
//! the pass-through escape hatch for anything the schema grows later.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::FieldMap;

/// One `Implementation__c` record as returned by the remote store.
///
/// Remote-computed fields (roll-ups such as `Actual_Hours_Spent__c`) are
/// present on reads but never written by the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImplementationRecord {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Implementation_Stage__c", skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(rename = "Program_Health__c", skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    #[serde(rename = "Type__c", skip_serializing_if = "Option::is_none")]
    pub implementation_type: Option<String>,
    #[serde(rename = "Contract_Type__c", skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(rename = "Migration_Type__c", skip_serializing_if = "Option::is_none")]
    pub migration_type: Option<String>,
    #[serde(rename = "Features__c", skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    #[serde(rename = "Account__c", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(rename = "Opportunity__c", skip_serializing_if = "Option::is_none")]
    pub opportunity_id: Option<String>,
    /// Assigned CDE user id; ownership gate for standard-role updates
    #[serde(rename = "CDE__c", skip_serializing_if = "Option::is_none")]
    pub cde_id: Option<String>,
    #[serde(rename = "CSM__c", skip_serializing_if = "Option::is_none")]
    pub csm_id: Option<String>,
    #[serde(rename = "Contracted_Hours__c", skip_serializing_if = "Option::is_none")]
    pub contracted_hours: Option<f64>,
    #[serde(rename = "Percent_Complete__c", skip_serializing_if = "Option::is_none")]
    pub percent_complete: Option<f64>,
    #[serde(rename = "In_Production__c", skip_serializing_if = "Option::is_none")]
    pub in_production: Option<bool>,
    #[serde(rename = "Risks__c", skip_serializing_if = "Option::is_none")]
    pub risks: Option<String>,
    #[serde(rename = "Comments__c", skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(rename = "Next_Step_Date__c", skip_serializing_if = "Option::is_none")]
    pub next_step_date: Option<NaiveDate>,
    #[serde(rename = "Estimated_Graduation_Date__c", skip_serializing_if = "Option::is_none")]
    pub estimated_graduation_date: Option<NaiveDate>,
    #[serde(rename = "Production_Date__c", skip_serializing_if = "Option::is_none")]
    pub production_date: Option<NaiveDate>,

    // Remote-computed (read-only) roll-ups
    #[serde(rename = "Actual_Hours_Spent__c", skip_serializing_if = "Option::is_none")]
    pub actual_hours_spent: Option<f64>,
    #[serde(rename = "Contracted_Hours_Remaining__c", skip_serializing_if = "Option::is_none")]
    pub contracted_hours_remaining: Option<f64>,
    #[serde(rename = "Days_In_Program__c", skip_serializing_if = "Option::is_none")]
    pub days_in_program: Option<f64>,
    #[serde(rename = "Stale_Days__c", skip_serializing_if = "Option::is_none")]
    pub stale_days: Option<f64>,

    /// Everything the typed model does not name, passed through untouched
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl ImplementationRecord {
    /// Parse a record out of a raw remote field map.
    ///
    /// Salesforce decorates query results with an `attributes` object; it is
    /// metadata, not a field, and is dropped here.
    pub fn from_field_map(mut map: FieldMap) -> crate::Result<Self> {
        map.remove("attributes");
        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| crate::GatewayError::Internal(format!("malformed record payload: {e}")))
    }

    /// Human-readable one-record summary for the conversational layer
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "**{}** (ID: {})",
            self.name.as_deref().unwrap_or("Unknown"),
            self.id.as_deref().unwrap_or("N/A"),
        ));

        let mut push = |label: &str, value: Option<String>| {
            if let Some(v) = value {
                if !v.is_empty() {
                    lines.push(format!("  {label}: {v}"));
                }
            }
        };

        push("Stage", self.stage.clone());
        push("Health", self.health.clone());
        push("Type", self.implementation_type.clone());
        push("Contract", self.contract_type.clone());
        push("% Complete", self.percent_complete.map(|v| v.to_string()));
        push("In Production", self.in_production.map(|v| v.to_string()));
        push("Contracted Hours", self.contracted_hours.map(|v| v.to_string()));
        push("Hours Spent", self.actual_hours_spent.map(|v| v.to_string()));
        push("Hours Remaining", self.contracted_hours_remaining.map(|v| v.to_string()));
        push("Days In Program", self.days_in_program.map(|v| v.to_string()));
        push("Stale Days", self.stale_days.map(|v| v.to_string()));
        push("Features", self.features.clone());
        push("Migration Type", self.migration_type.clone());
        push("Risks", self.risks.clone());
        push("Comments", self.comments.clone());
        push("Next Step Date", self.next_step_date.map(|d| d.to_string()));
        push("Graduation Date", self.estimated_graduation_date.map(|d| d.to_string()));
        push("Production Date", self.production_date.map(|d| d.to_string()));

        // Relationship names surface through the extra map when queried
        for (key, label) in [("Account__r", "Account"), ("Opportunity__r", "Opportunity")] {
            if let Some(related) = self.extra.get(key).and_then(|v| v.as_object()) {
                if let Some(name) = related.get("Name").and_then(|v| v.as_str()) {
                    lines.push(format!("  {label}: {name}"));
                }
            }
        }

        lines.join("\n")
    }
}
