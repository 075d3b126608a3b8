//! Local field validation
//!
//! The remote store rejects invalid picklist values with unstructured
//! errors, so enumerated and multi-valued inputs are checked here before a
//! request is ever built. Validation reports every invalid field found in a
//! request, not just the first, and never mutates the caller's input.
//!
//! Three classes of field names:
//! - **known writable** fields are validated against their kind;
//! - **remote-computed** fields are stripped from outbound payloads with a
//!   warning (the remote store owns roll-ups and formulas);
//! - **unknown** fields pass through unvalidated, flagged with a warning,
//!   so new schema fields keep working without a gateway release.

use serde_json::Value;
use tracing::warn;
use trackgate_domain::constants::{
    MULTIPICKLIST_DELIMITER, REMOTE_COMPUTED_FIELDS, VALID_CONTRACT_TYPES, VALID_FEATURES,
    VALID_IMPLEMENTATION_STAGES, VALID_MIGRATION_TYPES, VALID_PROGRAM_HEALTH, VALID_PROJECT_TASKS,
    VALID_PROJECT_TYPES, VALID_RECORD_STAGES, VALID_TYPES,
};
use trackgate_domain::{FieldMap, GatewayError, Result};

/// What the gateway knows about a writable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-valued enumeration; value must exactly match one member
    Picklist(&'static [&'static str]),
    /// `;`-joined set; every member must be individually valid
    MultiPicklist(&'static [&'static str]),
    Integer,
    Double,
    Date,
    Boolean,
    Text,
    /// Reference to another record (opaque id)
    Reference,
}

/// Kind registry for the writable fields of `Implementation__c`.
///
/// Returns `None` for unknown fields, which are passed through unvalidated.
pub fn implementation_field_kind(field: &str) -> Option<FieldKind> {
    use FieldKind::*;
    let kind = match field {
        "Implementation_Stage__c" => Picklist(VALID_IMPLEMENTATION_STAGES),
        "Program_Health__c" => Picklist(VALID_PROGRAM_HEALTH),
        "Type__c" => Picklist(VALID_TYPES),
        "Contract_Type__c" => Picklist(VALID_CONTRACT_TYPES),
        "Migration_Type__c" => Picklist(VALID_MIGRATION_TYPES),
        "Features__c" => MultiPicklist(VALID_FEATURES),

        "Contracted_Hours__c"
        | "Percent_Complete__c"
        | "ARR_Start_of_Program__c"
        | "ARR_End_of_Program__c"
        | "Compression_Ratio_Start_of_Program__c"
        | "Compression_Ratio_End_of_Program__c"
        | "DUM_Start_of_Program__c"
        | "DUM_End_of_Program__c"
        | "Tiered_Data_Start_of_Program__c"
        | "Tiered_Data_End_of_Program__c" => Double,

        "Adjustment_Days__c"
        | "Hypertables_Start_of_Program__c"
        | "Hypertables_End_of_Program__c"
        | "Caggs_Start_of_Program__c"
        | "Caggs_End_of_Program__c"
        | "Number_of_Services_Start_of_Program__c"
        | "Number_of_Services_End_of_Program__c" => Integer,

        "Customer_Start_Date__c"
        | "Kick_Off_Call__c"
        | "Estimated_Graduation_Date__c"
        | "Production_Date__c"
        | "Final_Review_Call__c"
        | "Next_Step_Date__c"
        | "X3_Month_Check_In__c" => Date,

        "In_Production__c" | "Technical_Win__c" => Boolean,

        "Risks__c" | "Comments__c" | "Post_Mortem__c" | "Migration_Source__c"
        | "Support_Tier__c" | "Grafana__c" | "Project_Doc__c" | "Billing_Category__c" => Text,

        "CDE__c" | "CSM__c" | "Contract__c" | "Account__c" | "Opportunity__c" => Reference,

        _ => return None,
    };
    Some(kind)
}

/// Kind registry for the writable fields of `Implementation_Hours__c`
pub fn hours_field_kind(field: &str) -> Option<FieldKind> {
    use FieldKind::*;
    let kind = match field {
        "Project_Task__c" => MultiPicklist(VALID_PROJECT_TASKS),
        "Project_Type__c" => Picklist(VALID_PROJECT_TYPES),
        "Record_Stage__c" => Picklist(VALID_RECORD_STAGES),
        "Hours_Worked__c" => Double,
        "Task_Date__c" => Date,
        "Notes__c" => Text,
        "Implementation__c" => Reference,
        _ => return None,
    };
    Some(kind)
}

fn is_remote_computed(field: &str) -> bool {
    REMOTE_COMPUTED_FIELDS.contains(&field)
}

/// Check one value against a field kind; `Err` carries the message
pub fn check_field_value(field: &str, kind: FieldKind, value: &Value) -> std::result::Result<(), String> {
    // Explicit null clears a field and is always acceptable locally
    if value.is_null() {
        return Ok(());
    }

    match kind {
        FieldKind::Picklist(valid) => {
            let Some(text) = value.as_str() else {
                return Err(format!("{field} expects a picklist value, got {value}"));
            };
            if valid.contains(&text) {
                Ok(())
            } else {
                Err(format!(
                    "Invalid value '{text}' for {field}. Valid values: {}",
                    valid.join(", ")
                ))
            }
        }
        FieldKind::MultiPicklist(valid) => {
            let Some(text) = value.as_str() else {
                return Err(format!("{field} expects a {MULTIPICKLIST_DELIMITER}-separated value, got {value}"));
            };
            let invalid: Vec<&str> = text
                .split(MULTIPICKLIST_DELIMITER)
                .map(str::trim)
                .filter(|member| !valid.contains(member))
                .collect();
            if invalid.is_empty() {
                Ok(())
            } else {
                Err(format!(
                    "Invalid value(s) [{}] for {field}. Valid values: {}",
                    invalid.join(", "),
                    valid.join(", ")
                ))
            }
        }
        FieldKind::Integer => {
            if value.as_i64().is_some() || value.as_u64().is_some() {
                Ok(())
            } else {
                Err(format!("{field} expects an integer, got {value}"))
            }
        }
        FieldKind::Double => {
            if value.is_number() {
                Ok(())
            } else {
                Err(format!("{field} expects a number, got {value}"))
            }
        }
        FieldKind::Date => {
            let Some(text) = value.as_str() else {
                return Err(format!("{field} expects a YYYY-MM-DD date, got {value}"));
            };
            match chrono::NaiveDate::parse_from_str(text, trackgate_domain::constants::DATE_FORMAT)
            {
                Ok(_) => Ok(()),
                Err(_) => Err(format!("Invalid date '{text}' for {field}. Expected YYYY-MM-DD")),
            }
        }
        FieldKind::Boolean => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(format!("{field} expects true or false, got {value}"))
            }
        }
        FieldKind::Text | FieldKind::Reference => {
            if value.is_string() {
                Ok(())
            } else {
                Err(format!("{field} expects a string, got {value}"))
            }
        }
    }
}

/// Validate a single field/value pair against the implementation registry.
///
/// Unknown fields pass; remote-computed fields pass here too (stripping is
/// [`prepare_implementation_payload`]'s job, not a validation failure).
pub fn validate_implementation_field(field: &str, value: &Value) -> std::result::Result<(), String> {
    match implementation_field_kind(field) {
        Some(kind) => check_field_value(field, kind, value),
        None => Ok(()),
    }
}

/// Validate every supplied field, reporting all offenders in one error.
///
/// The input is only read; values pass through unchanged on success.
pub fn validate_implementation_fields(fields: &FieldMap) -> Result<()> {
    let mut offenders = Vec::new();
    let mut messages = Vec::new();

    for (field, value) in fields {
        if let Err(message) = validate_implementation_field(field, value) {
            offenders.push(field.clone());
            messages.push(message);
        }
    }

    if offenders.is_empty() {
        Ok(())
    } else {
        Err(GatewayError::Validation { fields: offenders, message: messages.join("; ") })
    }
}

/// Prepare an outbound payload: drop remote-computed fields (warning) and
/// flag unknown field names (warning, passed through).
///
/// Returns the cleaned payload; the caller's map is consumed, not mutated
/// in place, so validation stays side-effect free for the caller.
pub fn prepare_implementation_payload(fields: FieldMap) -> FieldMap {
    let mut payload = FieldMap::new();
    for (field, value) in fields {
        if is_remote_computed(&field) {
            warn!(field = %field, "dropping remote-computed field from outbound payload");
            continue;
        }
        if implementation_field_kind(&field).is_none() {
            warn!(field = %field, "passing through unknown field unvalidated");
        }
        payload.insert(field, value);
    }
    payload
}
