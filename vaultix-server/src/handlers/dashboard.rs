use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{middleware::CurrentUser, models::RequestStatus, AppState};

/// GET /api/dashboard/:view
///
/// Aggregate counters per role view. Unknown views fall through to the
/// trust-authority summary.
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(view): Path<String>,
) -> Json<Value> {
    let body = state
        .store
        .read(|doc| match view.as_str() {
            "data_owner" => {
                let own_files: Vec<_> = doc.files.iter().filter(|f| f.owner_id == user.id).collect();
                let own_ids: HashSet<&str> = own_files.iter().map(|f| f.id.as_str()).collect();
                let approved_users: HashSet<&str> = doc
                    .access_requests
                    .iter()
                    .filter(|r| r.status == RequestStatus::Approved)
                    .map(|r| r.requester_id.as_str())
                    .collect();
                json!({
                    "totalFiles": own_files.len(),
                    "storageUsedMb": own_files.iter().map(|f| f.size_mb).sum::<f64>(),
                    "requestsReceived": doc
                        .access_requests
                        .iter()
                        .filter(|r| own_ids.contains(r.file_id.as_str()))
                        .count(),
                    "approvedUsers": approved_users.len(),
                })
            }
            "data_user" => json!({
                "availableFiles": doc.files.len(),
                "requestsMade": doc
                    .access_requests
                    .iter()
                    .filter(|r| r.requester_id == user.id)
                    .count(),
                "approvalsReceived": doc
                    .access_requests
                    .iter()
                    .filter(|r| r.requester_id == user.id && r.status == RequestStatus::Approved)
                    .count(),
            }),
            _ => json!({
                "approvalQueue": doc
                    .access_requests
                    .iter()
                    .filter(|r| r.status == RequestStatus::Pending)
                    .count(),
                "highRisk": doc.access_requests.iter().filter(|r| r.risk == "high").count(),
                "auditLogs": doc.access_requests.len(),
            }),
        })
        .await;
    Json(body)
}
