use serde::{Deserialize, Serialize};

/// The closed set of party roles. Every protected operation declares which
/// of these it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    DataOwner,
    DataUser,
    TrustAuthority,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::DataOwner => "data_owner",
            Role::DataUser => "data_user",
            Role::TrustAuthority => "trust_authority",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
