//! Hours logging command

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trackgate_core::hours::LogHoursRequest;
use trackgate_domain::Result;

use crate::context::GatewayContext;

/// Arguments for `log_hours`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogHoursArgs {
    /// Implementation record name (e.g. `IMPL-0042`) or id
    pub record_name_or_id: String,
    pub hours: f64,
    /// Required task tag, `;`-separated members of the task vocabulary.
    /// Must be confirmed by the user before calling.
    #[serde(default)]
    pub project_task: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// YYYY-MM-DD; defaults to today when omitted
    #[serde(default)]
    pub task_date: Option<NaiveDate>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub record_stage: Option<String>,
}

/// Result of `log_hours`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogHoursResult {
    pub hours_record_id: String,
    pub implementation_id: String,
    pub hours: f64,
    pub project_task: String,
    pub task_date: NaiveDate,
    pub summary: String,
}

/// Log hours against an implementation by creating a child record.
///
/// Unrestricted by role; shares the creation rate limit with
/// `create_implementation`.
pub async fn log_hours(context: &GatewayContext, args: LogHoursArgs) -> Result<LogHoursResult> {
    let record_name_or_id = args.record_name_or_id.clone();
    let notes = args.notes.clone();

    let logged = context
        .hours
        .log(LogHoursRequest {
            record_name_or_id: args.record_name_or_id,
            hours: args.hours,
            project_task: args.project_task,
            notes: args.notes,
            task_date: args.task_date,
            project_type: args.project_type,
            record_stage: args.record_stage,
        })
        .await?;

    let mut summary = format!(
        "Hours logged successfully.\n  Hours Record ID: {}\n  Implementation: {} (ID: {})\n  \
         Hours: {}\n  Task: {}\n  Date: {}",
        logged.hours_record_id,
        record_name_or_id,
        logged.implementation_id,
        logged.hours,
        logged.project_task,
        logged.task_date,
    );
    if let Some(notes) = notes {
        summary.push_str(&format!("\n  Notes: {notes}"));
    }

    Ok(LogHoursResult {
        hours_record_id: logged.hours_record_id,
        implementation_id: logged.implementation_id,
        hours: logged.hours,
        project_task: logged.project_task,
        task_date: logged.task_date,
        summary,
    })
}
