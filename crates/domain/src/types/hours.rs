//! Hours entry child record
//!
//! An `Implementation_Hours__c` record references exactly one implementation
//! and is create-only: the gateway never updates or deletes logged hours.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outbound payload for one logged-hours entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HoursEntry {
    #[serde(rename = "Implementation__c")]
    pub implementation_id: String,
    #[serde(rename = "Hours_Worked__c")]
    pub hours: f64,
    /// Required task tag; multipicklist, `;`-separated
    #[serde(rename = "Project_Task__c")]
    pub project_task: String,
    #[serde(rename = "Notes__c", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Defaults to the current date when the caller omits it
    #[serde(rename = "Task_Date__c")]
    pub task_date: NaiveDate,
    #[serde(rename = "Project_Type__c", skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(rename = "Record_Stage__c", skip_serializing_if = "Option::is_none")]
    pub record_stage: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_api_field_names() {
        let entry = HoursEntry {
            implementation_id: "a0B000000000001".into(),
            hours: 2.5,
            project_task: "Migration".into(),
            notes: None,
            task_date: NaiveDate::from_ymd_opt(2026, 2, 27).unwrap(),
            project_type: None,
            record_stage: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["Implementation__c"], "a0B000000000001");
        assert_eq!(json["Hours_Worked__c"], 2.5);
        assert_eq!(json["Task_Date__c"], "2026-02-27");
        assert!(json.get("Notes__c").is_none());
    }
}
