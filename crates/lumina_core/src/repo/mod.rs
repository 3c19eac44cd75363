//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Provide stable persistence APIs per entity on top of the canonical
//!   schema.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call the record's `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Availability mutation is only exposed as conditional single-statement
//!   updates (`reserve_copy`, `release_copy`, `mark_returned`).

use crate::db::DbError;
use crate::model::ValidationError;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod account_repo;
pub mod book_repo;
pub mod member_repo;
pub mod transaction_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RepoError::InvalidData(format!("invalid date value `{value}` in {column}")))
}

pub(crate) fn date_to_db(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_count(value: i64, column: &str) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid count value `{value}` in {column}")))
}
