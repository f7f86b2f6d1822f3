use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Terminal states a reviewer may set. Deserializing anything outside this
/// set fails, so malformed decisions are rejected instead of coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for RequestStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => RequestStatus::Approved,
            ReviewDecision::Rejected => RequestStatus::Rejected,
        }
    }
}

/// A data user's request for access to a file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub id: String,
    pub file_id: String,
    pub requester_id: String,
    pub status: RequestStatus,
    pub reason: String,
    pub risk: String,
    pub created_at: DateTime<Utc>,
}

impl AccessRequest {
    pub fn new(
        file_id: String,
        requester_id: String,
        reason: Option<String>,
        risk: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_id,
            requester_id,
            status: RequestStatus::Pending,
            reason: reason.unwrap_or_else(|| "Business request".to_string()),
            risk: risk.unwrap_or_else(|| "low".to_string()),
            created_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
