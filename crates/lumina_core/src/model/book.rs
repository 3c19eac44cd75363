//! Book catalog record.
//!
//! # Responsibility
//! - Define the canonical catalog entry and its availability bookkeeping
//!   invariant.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another book.
//! - `0 <= available <= quantity`; `available` only moves through copy
//!   reservation/release or an explicit validated edit.

use crate::model::account::AccountId;
use crate::model::{require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a catalog entry.
pub type BookId = Uuid;

/// Fallback cover shown when no image was uploaded for a book.
pub const DEFAULT_COVER_URL: &str =
    "https://images.unsplash.com/photo-1544947950-fa07a98d237f?w=200&h=300&fit=crop";

/// Canonical catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Stable global ID used for loans and auditing.
    pub uuid: BookId,
    pub title: String,
    pub author: String,
    /// Kept verbatim as entered, including hyphens.
    pub isbn: String,
    pub category: String,
    /// Copies owned by the library.
    pub quantity: u32,
    /// Copies not currently on loan.
    pub available: u32,
    /// Public cover image URL; `None` only for legacy rows.
    pub cover_url: Option<String>,
    /// Account that created the entry, when known.
    pub owner_account: Option<AccountId>,
}

impl Book {
    /// Creates a new catalog entry with every copy available.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        category: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            category: category.into(),
            quantity,
            available: quantity,
            cover_url: Some(DEFAULT_COVER_URL.to_string()),
            owner_account: None,
        }
    }

    /// Validates field presence and the availability invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("title", &self.title)?;
        require_non_empty("author", &self.author)?;
        require_non_empty("isbn", &self.isbn)?;
        require_non_empty("category", &self.category)?;
        if self.available > self.quantity {
            return Err(ValidationError::AvailableExceedsQuantity {
                available: self.available,
                quantity: self.quantity,
            });
        }
        Ok(())
    }

    /// Returns whether at least one copy can be issued right now.
    pub fn is_available(&self) -> bool {
        self.available > 0
    }
}
