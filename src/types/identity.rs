//! Requester identity as returned by the identity provider

use serde::{Deserialize, Serialize};

/// Role attached to an authenticated user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Patient,
    Physio,
    Admin,
}

impl UserRole {
    /// Roles allowed to read resources owned by other users
    pub fn is_clinical(&self) -> bool {
        matches!(self, UserRole::Physio | UserRole::Admin)
    }
}

/// Authenticated requester
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: UserRole,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn patient(user_id: impl Into<String>) -> Self {
        Self::new(user_id, UserRole::Patient)
    }
}
