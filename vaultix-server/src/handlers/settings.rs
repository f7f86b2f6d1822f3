use axum::{extract::State, Json};
use serde_json::{json, Map, Value};
use vaultix_core::error::AppError;

use crate::{middleware::CurrentUser, services::ServiceError, AppState};

fn default_settings() -> Value {
    json!({
        "notifications": true,
        "theme": "lavender-glass",
        "otpEnabled": true,
    })
}

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<Value> {
    let settings = state
        .store
        .read(|doc| doc.settings.get(&user.id).cloned())
        .await
        .unwrap_or_else(default_settings);
    Json(settings)
}

/// PUT /api/settings
///
/// Shallow merge: submitted keys overwrite, everything else is kept.
pub async fn update_settings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, AppError> {
    state
        .store
        .update(|doc| {
            let entry = doc
                .settings
                .entry(user.id.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(existing) = entry {
                for (key, value) in body {
                    existing.insert(key, value);
                }
            }
            Ok::<_, ServiceError>(())
        })
        .await?;

    Ok(Json(json!({ "message": "Settings saved" })))
}
