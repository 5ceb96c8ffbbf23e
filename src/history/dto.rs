use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::serde_ext;

/// One row of the scan history list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(deserialize_with = "serde_ext::id")]
    pub id: String,
    #[serde(default)]
    pub scan_type: Option<String>,
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default, deserialize_with = "serde_ext::opt_f64")]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub confidence_level: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub scans: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryDetailResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub scan: Option<Value>,
}
