use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::history::dto::{HistoryDetailResponse, HistoryEntry, HistoryListResponse};
use crate::results::{self, ScanResult};

#[derive(Clone)]
pub struct HistoryService {
    api: ApiClient,
}

impl HistoryService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> ClientResult<Vec<HistoryEntry>> {
        let res: HistoryListResponse = self.api.get_json("/history").await?;
        if !res.success {
            return Err(unsuccessful(res.message));
        }
        debug!(count = res.scans.len(), "history loaded");
        Ok(res.scans)
    }

    /// A past scan, re-validated like a fresh one.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> ClientResult<ScanResult> {
        validate_id(id)?;
        let res: HistoryDetailResponse = self.api.get_json(&format!("/history/{}", id)).await?;
        if !res.success {
            return Err(unsuccessful(res.message));
        }
        let scan = res
            .scan
            .ok_or_else(|| ClientError::MalformedResponse("missing scan".into()))?;
        results::project_value(scan)
    }
}

fn unsuccessful(message: Option<String>) -> ClientError {
    let body = message.unwrap_or_else(|| "request was not successful".to_string());
    warn!(%body, "history request reported failure");
    ClientError::Backend { status: 200, body }
}

fn validate_id(id: &str) -> ClientResult<()> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ClientError::Validation(format!("invalid scan id {:?}", id)))
    }
}

/// Short age label for list rows.
pub fn relative_age(created_at: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = (now - created_at).max(time::Duration::ZERO);
    let minutes = elapsed.whole_minutes();
    let hours = elapsed.whole_hours();
    let days = elapsed.whole_days();

    if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        created_at.date().to_string()
    }
}
