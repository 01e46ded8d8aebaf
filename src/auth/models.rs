//! Identity types carried by an admission decision.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse role attached to an authenticated subscriber, carried for
/// diagnostics and future authorization policy; the hub itself does not
/// branch on role anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Viewer,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::User => write!(f, "user"),
            UserRole::Viewer => write!(f, "viewer"),
        }
    }
}

/// The identity behind an admitted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn new(username: String, role: UserRole) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            role,
            active: true,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin && self.active
    }
}
