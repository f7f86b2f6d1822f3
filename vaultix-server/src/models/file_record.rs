use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File metadata record. No file bytes are stored or transferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub size_mb: f64,
    pub owner_id: String,
    pub permission: String,
}

impl FileRecord {
    pub fn new(
        name: String,
        category: Option<String>,
        size_mb: Option<f64>,
        permission: Option<String>,
        owner_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            category: category.unwrap_or_else(|| "General".to_string()),
            size_mb: size_mb.unwrap_or(1.0),
            owner_id,
            permission: permission.unwrap_or_else(|| "Internal".to_string()),
        }
    }
}
