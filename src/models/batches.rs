use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::DEFAULT_PAGE_LIMIT;

/// A production lot of units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub batch_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    pub batch_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
}

impl CreateBatchRequest {
    pub fn new(batch_number: impl Into<String>) -> Self {
        Self {
            batch_number: batch_number.into(),
            part_number: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListBatchesRequest {
    pub search_query: Option<String>,
    pub ids: Vec<String>,
    pub limit: Option<u32>,
    pub cursor: Option<f64>,
}

impl Default for ListBatchesRequest {
    fn default() -> Self {
        Self {
            search_query: None,
            ids: Vec::new(),
            limit: Some(DEFAULT_PAGE_LIMIT),
            cursor: None,
        }
    }
}
