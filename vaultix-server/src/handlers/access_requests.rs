//! Access request workflow: data users open requests, data owners and trust
//! authorities decide them.

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use vaultix_core::error::AppError;

use crate::{
    dtos::access::{CreateAccessRequest, ReviewRequest},
    middleware::{authorize, CurrentUser},
    models::{AccessRequest, Role},
    services::ServiceError,
    utils::ValidatedJson,
    AppState,
};

/// GET /api/access-requests
///
/// The visible slice depends on the caller's role: data users see their own
/// requests, data owners see requests against their files, trust
/// authorities see everything.
pub async fn list_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<AccessRequest>>, AppError> {
    let requests = state
        .store
        .read(|doc| match user.role {
            Role::DataUser => doc
                .access_requests
                .iter()
                .filter(|r| r.requester_id == user.id)
                .cloned()
                .collect(),
            Role::DataOwner => {
                let own_files: HashSet<&str> = doc
                    .files
                    .iter()
                    .filter(|f| f.owner_id == user.id)
                    .map(|f| f.id.as_str())
                    .collect();
                doc.access_requests
                    .iter()
                    .filter(|r| own_files.contains(r.file_id.as_str()))
                    .cloned()
                    .collect()
            }
            Role::TrustAuthority => doc.access_requests.clone(),
        })
        .await;
    Ok(Json(requests))
}

/// POST /api/access-requests
pub async fn create_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateAccessRequest>,
) -> Result<(StatusCode, Json<AccessRequest>), AppError> {
    authorize(&user, &[Role::DataUser])?;

    let now = state.clock.now();
    let created = state
        .store
        .update(|doc| {
            // The file-exists check lives inside the write so the file
            // cannot vanish between check and insert.
            if !doc.files.iter().any(|f| f.id == req.file_id) {
                return Err(ServiceError::FileNotFound);
            }
            let request =
                AccessRequest::new(req.file_id.clone(), user.id.clone(), req.reason, req.risk, now);
            doc.access_requests.push(request.clone());
            Ok(request)
        })
        .await?;

    tracing::info!(request_id = %created.id, file_id = %created.file_id, "Access request opened");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/access-requests/:id
///
/// Decisions are final: a request that already left `pending` cannot be
/// decided again.
pub async fn decide_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ReviewRequest>,
) -> Result<Json<AccessRequest>, AppError> {
    authorize(&user, &[Role::DataOwner, Role::TrustAuthority])?;

    let updated = state
        .store
        .update(|doc| {
            let request = doc
                .access_requests
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(ServiceError::RequestNotFound)?;
            if !request.is_pending() {
                return Err(ServiceError::AlreadyDecided);
            }
            request.status = req.status.into();
            Ok(request.clone())
        })
        .await?;

    tracing::info!(request_id = %updated.id, status = ?updated.status, reviewer_id = %user.id, "Access request decided");
    Ok(Json(updated))
}
