//! Overdue and fine derivations.
//!
//! # Responsibility
//! - Decide overdue display state for active transactions.
//! - Derive advisory fines from days overdue.
//!
//! # Invariants
//! - Fines are derived fresh at read time and never persisted; the
//!   `fine` column on transactions is not consulted here.
//! - Only `active` transactions can be overdue; returned rows never
//!   accrue fines regardless of dates.

use crate::model::transaction::TransactionStatus;
use crate::repo::transaction_repo::TransactionRecord;
use chrono::NaiveDate;

/// Flat advisory fine per day overdue, in dollars.
pub const FINE_PER_DAY_USD: f64 = 0.50;

/// Whether an active transaction is past due on `today`.
pub fn is_overdue(status: TransactionStatus, due_date: NaiveDate, today: NaiveDate) -> bool {
    status == TransactionStatus::Active && due_date < today
}

/// Whole days elapsed past the due date; zero when not yet due.
pub fn days_overdue(due_date: NaiveDate, today: NaiveDate) -> u32 {
    if today <= due_date {
        return 0;
    }
    // Dates differ by whole days, so the signed difference is exact.
    (today - due_date).num_days() as u32
}

/// Advisory fine for a due date evaluated on `today`, ignoring status.
pub fn fine_amount(due_date: NaiveDate, today: NaiveDate) -> f64 {
    f64::from(days_overdue(due_date, today)) * FINE_PER_DAY_USD
}

/// Advisory fine for one record; zero unless the record is overdue.
pub fn record_fine(record: &TransactionRecord, today: NaiveDate) -> f64 {
    if is_overdue(record.status, record.due_date, today) {
        fine_amount(record.due_date, today)
    } else {
        0.0
    }
}

/// Display status for one record: active-past-due renders as overdue,
/// everything else as persisted.
pub fn display_status(record: &TransactionRecord, today: NaiveDate) -> TransactionStatus {
    if is_overdue(record.status, record.due_date, today) {
        TransactionStatus::Overdue
    } else {
        record.status
    }
}

/// Filters down to the records that are overdue on `today`.
pub fn overdue_records<'a>(
    records: &'a [TransactionRecord],
    today: NaiveDate,
) -> Vec<&'a TransactionRecord> {
    records
        .iter()
        .filter(|record| is_overdue(record.status, record.due_date, today))
        .collect()
}

/// Sums the advisory fines of every overdue record.
pub fn outstanding_fines(records: &[TransactionRecord], today: NaiveDate) -> f64 {
    records
        .iter()
        .map(|record| record_fine(record, today))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::{days_overdue, fine_amount, is_overdue, outstanding_fines, record_fine};
    use crate::model::transaction::{TransactionKind, TransactionStatus};
    use crate::repo::transaction_repo::TransactionRecord;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(status: TransactionStatus, due: NaiveDate) -> TransactionRecord {
        TransactionRecord {
            uuid: Uuid::new_v4(),
            book_uuid: Uuid::new_v4(),
            member_uuid: Uuid::new_v4(),
            kind: TransactionKind::Issue,
            issue_date: date(2024, 1, 1),
            due_date: due,
            return_date: None,
            status,
            fine: None,
            book_title: Some("Dune".to_string()),
            book_isbn: Some("978-0441172719".to_string()),
            member_name: Some("Ada Lovelace".to_string()),
            member_email: Some("ada@example.com".to_string()),
        }
    }

    #[test]
    fn five_days_past_due_costs_two_fifty() {
        let due = date(2024, 1, 15);
        let today = date(2024, 1, 20);
        assert!(is_overdue(TransactionStatus::Active, due, today));
        assert_eq!(days_overdue(due, today), 5);
        assert_eq!(fine_amount(due, today), 2.50);
    }

    #[test]
    fn no_fine_on_or_before_due_date() {
        let due = date(2024, 1, 15);
        assert_eq!(days_overdue(due, due), 0);
        assert_eq!(fine_amount(due, date(2024, 1, 10)), 0.0);
        assert!(!is_overdue(TransactionStatus::Active, due, due));
    }

    #[test]
    fn returned_records_never_accrue_fines() {
        let past_due = record(TransactionStatus::Returned, date(2024, 1, 15));
        assert_eq!(record_fine(&past_due, date(2024, 2, 1)), 0.0);
    }

    #[test]
    fn outstanding_fines_sums_only_overdue_records() {
        let today = date(2024, 1, 20);
        let records = vec![
            record(TransactionStatus::Active, date(2024, 1, 15)), // 5 days
            record(TransactionStatus::Active, date(2024, 1, 18)), // 2 days
            record(TransactionStatus::Active, date(2024, 1, 25)), // not due
            record(TransactionStatus::Returned, date(2024, 1, 1)),
        ];
        assert_eq!(outstanding_fines(&records, today), 3.50);
    }
}
