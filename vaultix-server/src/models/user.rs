use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// User record. Created at registration, mutated by profile updates, never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub organization: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    /// Argon2id PHC string; carries its own salt.
    pub password_hash: String,
}

impl User {
    pub fn new(
        name: String,
        email: String,
        role: Role,
        organization: Option<String>,
        password_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            role,
            organization: organization.unwrap_or_else(|| "Independent".to_string()),
            phone: String::new(),
            location: String::new(),
            bio: String::new(),
            password_hash,
        }
    }

    pub fn sanitized(&self) -> SanitizedUser {
        SanitizedUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            organization: self.organization.clone(),
            phone: self.phone.clone(),
            location: self.location.clone(),
            bio: self.bio.clone(),
        }
    }
}

/// User view safe to return to clients: everything except the credential.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub organization: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
}
