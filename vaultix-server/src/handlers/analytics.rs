use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{models::RequestStatus, AppState};

/// GET /api/analytics
///
/// Public summary figures for the landing page. Nothing here is
/// per-user, so the route sits outside the bearer gate.
pub async fn analytics(State(state): State<AppState>) -> Json<Value> {
    let body = state
        .store
        .read(|doc| {
            let total = doc.access_requests.len();
            let approved = doc
                .access_requests
                .iter()
                .filter(|r| r.status == RequestStatus::Approved)
                .count();
            let pending = doc
                .access_requests
                .iter()
                .filter(|r| r.status == RequestStatus::Pending)
                .count();
            let approval_rate = if total > 0 {
                ((approved as f64 / total as f64) * 100.0).round() as i64
            } else {
                0
            };
            json!({
                "storageUsage": doc.files.iter().map(|f| f.size_mb).sum::<f64>().min(100.0),
                "accessTrends": 63,
                "approvalRates": approval_rate,
                "categories": ["Legal", "Finance", "Security"],
                "pendingRequests": pending,
            })
        })
        .await;
    Json(body)
}
