use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::DEFAULT_PAGE_LIMIT;

/// A physical test station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_procedure_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStationRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateStationRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkProcedureRequest {
    pub procedure_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListStationsRequest {
    pub search_query: Option<String>,
    pub ids: Vec<String>,
    pub limit: Option<u32>,
    pub cursor: Option<f64>,
}

impl Default for ListStationsRequest {
    fn default() -> Self {
        Self {
            search_query: None,
            ids: Vec::new(),
            limit: Some(DEFAULT_PAGE_LIMIT),
            cursor: None,
        }
    }
}
