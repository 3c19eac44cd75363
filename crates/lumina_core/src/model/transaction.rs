//! Loan transaction record.
//!
//! # Responsibility
//! - Define the issue/return transaction and its state machine.
//! - Own the loan-period policy used to derive due dates.
//!
//! # Invariants
//! - `due_date = issue_date + LOAN_PERIOD_DAYS`, computed once at
//!   issuance and never recomputed.
//! - A return mutates the same row in place (`kind`, `status`,
//!   `return_date`); there is no separate return record.
//! - `fine` is never written by the core; fines are derived at read time
//!   (see `report::fines`).

use crate::model::book::BookId;
use crate::model::member::MemberId;
use crate::model::ValidationError;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a transaction row.
pub type TransactionId = Uuid;

/// Fixed loan period applied to every issuance.
pub const LOAN_PERIOD_DAYS: u64 = 14;

/// Direction of a transaction row. An `Issue` row becomes a `Return` row
/// in place when the book comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Issue,
    Return,
}

/// Persisted lifecycle state of a transaction.
///
/// `Overdue` exists as a persisted value for compatibility with imported
/// data; the core itself derives overdue display state from `Active` rows
/// and never writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Active,
    Returned,
    Overdue,
}

/// Canonical loan record referencing exactly one book and one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub uuid: TransactionId,
    pub book_uuid: BookId,
    pub member_uuid: MemberId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    /// Advisory fine carried by imported data only; the core never sets it.
    pub fine: Option<f64>,
}

impl Transaction {
    /// Creates an active issuance dated `issue_date` with the fixed-policy
    /// due date.
    pub fn issue(book_uuid: BookId, member_uuid: MemberId, issue_date: NaiveDate) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            book_uuid,
            member_uuid,
            kind: TransactionKind::Issue,
            issue_date,
            due_date: due_date_for(issue_date),
            return_date: None,
            status: TransactionStatus::Active,
            fine: None,
        }
    }

    /// Validates date ordering.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.due_date < self.issue_date {
            return Err(ValidationError::DueBeforeIssue);
        }
        if let Some(returned) = self.return_date {
            if returned < self.issue_date {
                return Err(ValidationError::ReturnBeforeIssue);
            }
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }
}

/// Applies the fixed loan-period policy to an issue date.
pub fn due_date_for(issue_date: NaiveDate) -> NaiveDate {
    // NaiveDate + 14 days cannot overflow for any date this system stores.
    issue_date
        .checked_add_days(Days::new(LOAN_PERIOD_DAYS))
        .unwrap_or(issue_date)
}

#[cfg(test)]
mod tests {
    use super::{due_date_for, Transaction, TransactionKind, TransactionStatus};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn issue_computes_fixed_due_date() {
        let tx = Transaction::issue(Uuid::new_v4(), Uuid::new_v4(), date(2024, 1, 1));
        assert_eq!(tx.due_date, date(2024, 1, 15));
        assert_eq!(tx.kind, TransactionKind::Issue);
        assert_eq!(tx.status, TransactionStatus::Active);
        assert!(tx.return_date.is_none());
        assert!(tx.fine.is_none());
    }

    #[test]
    fn due_date_crosses_month_boundary() {
        assert_eq!(due_date_for(date(2024, 2, 20)), date(2024, 3, 5));
    }

    #[test]
    fn validate_rejects_return_before_issue() {
        let mut tx = Transaction::issue(Uuid::new_v4(), Uuid::new_v4(), date(2024, 1, 10));
        tx.return_date = Some(date(2024, 1, 2));
        assert!(tx.validate().is_err());
    }

    #[test]
    fn serialization_uses_wire_field_names() {
        let tx = Transaction::issue(Uuid::new_v4(), Uuid::new_v4(), date(2024, 1, 1));
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "issue");
        assert_eq!(json["status"], "active");
        assert_eq!(json["issue_date"], "2024-01-01");
        assert_eq!(json["due_date"], "2024-01-15");
    }
}
