//! Domain records for the Lumina circulation core.
//!
//! # Responsibility
//! - Define the canonical records persisted by the repositories.
//! - Own field-level validation shared by all write paths.
//!
//! # Invariants
//! - `0 <= available <= quantity` for every book.
//! - `due_date >= issue_date` and, when present,
//!   `return_date >= issue_date` for every transaction.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account;
pub mod book;
pub mod member;
pub mod transaction;

/// Field-level validation failure shared by all domain records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace-only.
    EmptyField(&'static str),
    /// Book availability exceeds the owned quantity.
    AvailableExceedsQuantity { available: u32, quantity: u32 },
    /// Transaction due date precedes its issue date.
    DueBeforeIssue,
    /// Transaction return date precedes its issue date.
    ReturnBeforeIssue,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "required field `{field}` is empty"),
            Self::AvailableExceedsQuantity {
                available,
                quantity,
            } => write!(
                f,
                "available count {available} exceeds owned quantity {quantity}"
            ),
            Self::DueBeforeIssue => write!(f, "due date precedes issue date"),
            Self::ReturnBeforeIssue => write!(f, "return date precedes issue date"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}
