use serde::Deserialize;
use validator::Validate;

use crate::models::ReviewDecision;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    #[validate(length(min = 1, message = "File name required"))]
    pub name: String,
    pub category: Option<String>,
    pub size_mb: Option<f64>,
    pub permission: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccessRequest {
    #[validate(length(min = 1, message = "File id required"))]
    pub file_id: String,
    pub reason: Option<String>,
    pub risk: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// Only `approved` or `rejected` parse; anything else is a 400.
    pub status: ReviewDecision,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}
