use axum::{extract::State, Json};
use serde_json::json;
use vaultix_core::error::AppError;

use crate::{
    dtos::access::UpdateProfileRequest,
    middleware::CurrentUser,
    models::SanitizedUser,
    services::ServiceError,
    utils::ValidatedJson,
    AppState,
};

/// GET /api/profile
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<SanitizedUser> {
    Json(user.sanitized())
}

/// PUT /api/profile
///
/// Only the whitelisted descriptive fields are writable. Email, role, and
/// the credential never change through this route.
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .store
        .update(|doc| {
            let stored = doc
                .users
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or(ServiceError::UserNotFound)?;
            if let Some(name) = req.name {
                stored.name = name;
            }
            if let Some(phone) = req.phone {
                stored.phone = phone;
            }
            if let Some(organization) = req.organization {
                stored.organization = organization;
            }
            if let Some(location) = req.location {
                stored.location = location;
            }
            if let Some(bio) = req.bio {
                stored.bio = bio;
            }
            Ok::<_, ServiceError>(())
        })
        .await?;

    Ok(Json(json!({ "message": "Profile updated" })))
}
