//! Sign-in account record.
//!
//! # Responsibility
//! - Define the account identity and role used for session gating.
//!
//! # Invariants
//! - `email` is unique across accounts.
//! - The password hash never appears on this record; it stays inside the
//!   repository credential row.

use crate::model::{require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a sign-in account.
pub type AccountId = Uuid;

/// Role flag used for admin gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
}

/// Canonical account record exposed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub uuid: AccountId,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl Account {
    pub fn new(email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            role,
        }
    }

    /// Validates field presence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("email", &self.email)?;
        require_non_empty("name", &self.name)?;
        Ok(())
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
