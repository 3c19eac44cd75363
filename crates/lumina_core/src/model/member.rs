//! Library member record.
//!
//! # Responsibility
//! - Define the member registry entry and its lifecycle states.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another member.
//! - Deletion is a hard delete; transaction history referencing the
//!   member is left in place and read paths tolerate it.

use crate::model::account::AccountId;
use crate::model::{require_non_empty, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a registry entry.
pub type MemberId = Uuid;

/// Fallback avatar shown when no photo was uploaded for a member.
pub const DEFAULT_AVATAR_URL: &str =
    "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=100&h=100&fit=crop";

/// Membership tier, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    Student,
    Faculty,
    General,
}

/// Member lifecycle state. Inactive members stay in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
}

/// Canonical registry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable global ID referenced by transactions.
    pub uuid: MemberId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub membership_type: MembershipType,
    pub status: MemberStatus,
    /// Date the member joined, fixed at registration.
    pub join_date: NaiveDate,
    /// Public avatar URL; `None` only for legacy rows.
    pub avatar_url: Option<String>,
    /// Sign-in account linked to this member, when one exists. Required
    /// for the self-service borrow path.
    pub account_uuid: Option<AccountId>,
}

impl Member {
    /// Creates an active member joining on the provided date.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        membership_type: MembershipType,
        join_date: NaiveDate,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            membership_type,
            status: MemberStatus::Active,
            join_date,
            avatar_url: Some(DEFAULT_AVATAR_URL.to_string()),
            account_uuid: None,
        }
    }

    /// Validates field presence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("email", &self.email)?;
        require_non_empty("phone", &self.phone)?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}
