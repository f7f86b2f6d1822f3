use axum::{extract::State, http::StatusCode, Json};
use vaultix_core::error::AppError;

use crate::{
    dtos::access::CreateFileRequest,
    middleware::{authorize, CurrentUser},
    models::{FileRecord, Role},
    services::ServiceError,
    utils::ValidatedJson,
    AppState,
};

/// GET /api/files
///
/// Any authenticated user may browse the catalog; access to the underlying
/// data is what goes through the request workflow.
pub async fn list_files(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<FileRecord>>, AppError> {
    let files = state.store.read(|doc| doc.files.clone()).await;
    Ok(Json(files))
}

/// POST /api/files
pub async fn create_file(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateFileRequest>,
) -> Result<(StatusCode, Json<FileRecord>), AppError> {
    authorize(&user, &[Role::DataOwner])?;

    let record = FileRecord::new(req.name, req.category, req.size_mb, req.permission, user.id);
    let created = record.clone();
    state
        .store
        .update(|doc| {
            doc.files.push(record);
            Ok::<_, ServiceError>(())
        })
        .await?;

    tracing::info!(file_id = %created.id, owner_id = %created.owner_id, "File record created");
    Ok((StatusCode::CREATED, Json(created)))
}
