pub mod access;
pub mod auth;

use serde::Serialize;

/// Standard error body: `{"error": message}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
