use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::DEFAULT_PAGE_LIMIT;
use super::enums::{LogLevel, MeasurementOutcome, PhaseOutcome, RunOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RunOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// ISO 8601 duration as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<RunPhase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<RunLog>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<RunAttachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operated_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPhase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<PhaseOutcome>,
    #[serde(default)]
    pub start_time_millis: i64,
    #[serde(default)]
    pub end_time_millis: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Vec<RunMeasurement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMeasurement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<MeasurementOutcome>,
    /// Number, string, boolean or structured value, exactly as recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validators: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Body of `POST /v2/runs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRunRequest {
    pub outcome: RunOutcome,
    pub procedure_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub serial_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    /// Serial numbers of units assembled into this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_units: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<CreateRunPhase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<CreateRunLog>>,
}

impl CreateRunRequest {
    pub fn new(
        procedure_id: impl Into<String>,
        serial_number: impl Into<String>,
        outcome: RunOutcome,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Self {
        Self {
            outcome,
            procedure_id: procedure_id.into(),
            started_at,
            ended_at,
            serial_number: serial_number.into(),
            procedure_version: None,
            operated_by: None,
            part_number: None,
            revision_number: None,
            batch_number: None,
            sub_units: None,
            docstring: None,
            phases: None,
            logs: None,
        }
    }

    pub fn with_part(mut self, part_number: impl Into<String>, revision: Option<String>) -> Self {
        self.part_number = Some(part_number.into());
        self.revision_number = revision;
        self
    }

    pub fn with_phases(mut self, phases: Vec<CreateRunPhase>) -> Self {
        self.phases = Some(phases);
        self
    }

    pub fn with_logs(mut self, logs: Vec<CreateRunLog>) -> Self {
        self.logs = Some(logs);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRunPhase {
    pub name: String,
    pub outcome: PhaseOutcome,
    pub start_time_millis: i64,
    pub end_time_millis: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Vec<CreateRunMeasurement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRunMeasurement {
    pub name: String,
    pub outcome: MeasurementOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validators: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRunLog {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i32>,
}

/// Body of `PATCH /v2/runs/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRunRequest {
    /// Upload ids to link to the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}

/// Filters for `GET /v2/runs`. Unset fields are left out of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRunsRequest {
    pub search_query: Option<String>,
    pub ids: Vec<String>,
    pub outcomes: Vec<RunOutcome>,
    pub procedure_ids: Vec<String>,
    pub procedure_versions: Vec<String>,
    pub serial_numbers: Vec<String>,
    pub part_numbers: Vec<String>,
    pub revision_numbers: Vec<String>,
    /// ISO 8601 durations, e.g. `PT30S`.
    pub duration_min: Option<String>,
    pub duration_max: Option<String>,
    pub started_after: Option<DateTime<Utc>>,
    pub started_before: Option<DateTime<Utc>>,
    pub ended_after: Option<DateTime<Utc>>,
    pub ended_before: Option<DateTime<Utc>>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub created_by_user_ids: Vec<String>,
    pub created_by_station_ids: Vec<String>,
    pub operated_by_ids: Vec<String>,
    pub limit: Option<u32>,
    pub cursor: Option<f64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl Default for ListRunsRequest {
    fn default() -> Self {
        Self {
            search_query: None,
            ids: Vec::new(),
            outcomes: Vec::new(),
            procedure_ids: Vec::new(),
            procedure_versions: Vec::new(),
            serial_numbers: Vec::new(),
            part_numbers: Vec::new(),
            revision_numbers: Vec::new(),
            duration_min: None,
            duration_max: None,
            started_after: None,
            started_before: None,
            ended_after: None,
            ended_before: None,
            created_after: None,
            created_before: None,
            created_by_user_ids: Vec::new(),
            created_by_station_ids: Vec::new(),
            operated_by_ids: Vec::new(),
            limit: Some(DEFAULT_PAGE_LIMIT),
            cursor: None,
            sort_by: Some("started_at".to_string()),
            sort_order: Some("desc".to_string()),
        }
    }
}
