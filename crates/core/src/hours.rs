//! Hours logging
//!
//! Creates `Implementation_Hours__c` child records. Log-hours is
//! unrestricted by role (any resolved caller may log hours on any
//! implementation) but shares the creation rate limit with
//! `create_implementation`, since both create records remotely.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use trackgate_common::resilience::SlidingWindow;
use trackgate_domain::constants::SOBJECT_IMPLEMENTATION_HOURS;
use trackgate_domain::types::hours::HoursEntry;
use trackgate_domain::{GatewayError, Result};

use crate::implementations::{rate_limited_error, resolve_implementation_id};
use crate::ports::RecordStore;
use crate::validation::{hours_field_kind, FieldKind};

/// Request to log hours against an implementation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogHoursRequest {
    /// Implementation record name (e.g. `IMPL-0042`) or id
    pub record_name_or_id: String,
    pub hours: f64,
    /// Required task tag; `;`-separated members of the task vocabulary
    pub project_task: Option<String>,
    pub notes: Option<String>,
    /// Defaults to today when omitted
    pub task_date: Option<NaiveDate>,
    pub project_type: Option<String>,
    pub record_stage: Option<String>,
}

/// Outcome of a successful log-hours call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedHours {
    pub hours_record_id: String,
    pub implementation_id: String,
    pub hours: f64,
    pub project_task: String,
    pub task_date: NaiveDate,
}

/// Service for the log-hours operation
pub struct HoursService {
    store: Arc<dyn RecordStore>,
    create_limiter: SlidingWindow,
}

impl HoursService {
    /// `create_limiter` should be a clone of the implementation service's
    /// limiter so both creation paths share one window.
    pub fn new(store: Arc<dyn RecordStore>, create_limiter: SlidingWindow) -> Self {
        Self { store, create_limiter }
    }

    /// Log hours by creating a child record.
    ///
    /// The task tag is required — a missing or invalid tag fails validation
    /// locally and no remote create is issued.
    pub async fn log(&self, request: LogHoursRequest) -> Result<LoggedHours> {
        let project_task = self.validate(&request)?;

        if !self.create_limiter.try_acquire() {
            return Err(rate_limited_error(&self.create_limiter));
        }

        let implementation_id =
            resolve_implementation_id(self.store.as_ref(), &request.record_name_or_id).await?;

        let task_date = request.task_date.unwrap_or_else(|| chrono::Local::now().date_naive());
        let entry = HoursEntry {
            implementation_id: implementation_id.clone(),
            hours: request.hours,
            project_task: project_task.clone(),
            notes: request.notes.clone(),
            task_date,
            project_type: request.project_type.clone(),
            record_stage: request.record_stage.clone(),
        };

        let body = serde_json::to_value(&entry)
            .map_err(|e| GatewayError::Internal(format!("failed to encode hours entry: {e}")))?;
        let hours_record_id =
            self.store.create_record(SOBJECT_IMPLEMENTATION_HOURS, &body).await?;
        info!(
            hours_record_id = %hours_record_id,
            implementation_id = %implementation_id,
            hours = request.hours,
            "logged hours"
        );

        Ok(LoggedHours {
            hours_record_id,
            implementation_id,
            hours: request.hours,
            project_task,
            task_date,
        })
    }

    /// Validate the enumerated inputs, reporting every offender at once.
    /// Returns the confirmed task tag.
    fn validate(&self, request: &LogHoursRequest) -> Result<String> {
        let mut offenders = Vec::new();
        let mut messages = Vec::new();

        let project_task = match request.project_task.as_deref().map(str::trim) {
            Some(task) if !task.is_empty() => Some(task.to_string()),
            _ => {
                offenders.push("Project_Task__c".to_string());
                messages.push(
                    "a project task is required; ask the user to select one from the task list"
                        .to_string(),
                );
                None
            }
        };

        let mut check = |field: &str, value: Option<&str>| {
            let Some(value) = value else { return };
            let kind = hours_field_kind(field).unwrap_or(FieldKind::Text);
            if let Err(message) = check_picklist(field, kind, value) {
                offenders.push(field.to_string());
                messages.push(message);
            }
        };

        check("Project_Task__c", project_task.as_deref());
        check("Project_Type__c", request.project_type.as_deref());
        check("Record_Stage__c", request.record_stage.as_deref());

        if offenders.is_empty() {
            // offenders is empty only when the task tag was present and valid
            Ok(project_task.unwrap_or_default())
        } else {
            Err(GatewayError::Validation { fields: offenders, message: messages.join("; ") })
        }
    }
}

/// Shape-check a picklist/multipicklist value through the shared validator
fn check_picklist(field: &str, kind: FieldKind, value: &str) -> std::result::Result<(), String> {
    match kind {
        FieldKind::Picklist(_) | FieldKind::MultiPicklist(_) => {
            crate::validation::check_field_value(field, kind, &json!(value))
        }
        _ => Ok(()),
    }
}
