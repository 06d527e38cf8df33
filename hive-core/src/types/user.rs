//! Collaborator accounts and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Collaborator role, carried in the JWT role claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Triager,
    Auditor,
    Educator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Triager => "triager",
            Self::Auditor => "auditor",
            Self::Educator => "educator",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "triager" => Some(Self::Triager),
            "auditor" => Some(Self::Auditor),
            "educator" => Some(Self::Educator),
            _ => None,
        }
    }
}

/// A staff account. Accounts are seeded from configuration at startup;
/// there is no user-management surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// bcrypt hash, never the plaintext.
    pub password_hash: String,
    pub role: Role,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
