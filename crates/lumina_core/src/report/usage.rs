//! Aggregate usage derivations for the dashboard and reports screens.
//!
//! # Responsibility
//! - Fold fetched book/member/transaction lists into chart and
//!   leaderboard projections.
//!
//! # Invariants
//! - All outputs are deterministically ordered.
//! - Leaderboards silently drop entries whose referenced entity has been
//!   deleted; dropped entries still consume ranking slots.
//! - Monthly buckets key on the abbreviated month name only, so data
//!   from the same month of different years merges.

use crate::model::book::Book;
use crate::model::member::Member;
use crate::model::transaction::{TransactionKind, TransactionStatus};
use crate::repo::transaction_repo::TransactionRecord;
use crate::report::fines::outstanding_fines;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use uuid::Uuid;

/// Fixed display ordering for monthly buckets.
const MONTH_ORDER: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Books-per-category bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: u32,
}

/// Issued/returned counts for one month-name bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyActivity {
    pub month: &'static str,
    pub issued: u32,
    pub returned: u32,
}

/// Leaderboard row for member activity.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberActivity {
    pub member: Member,
    pub transactions: u32,
}

/// Leaderboard row for book popularity.
#[derive(Debug, Clone, PartialEq)]
pub struct BookPopularity {
    pub book: Book,
    pub issues: u32,
}

/// Headline numbers for the dashboard stat cards.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_books: usize,
    pub active_members: usize,
    /// Transactions currently in the `active` state.
    pub books_issued: usize,
    /// Sum of advisory fines over all overdue records.
    pub estimated_fines: f64,
}

/// Search and filter options for the transactions screen.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive substring over book title, member name and ISBN.
    pub search: String,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
}

/// Counts books per category, most populated first, name as tie-break.
pub fn category_distribution(books: &[Book]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for book in books {
        *counts.entry(book.category.as_str()).or_default() += 1;
    }

    let mut distribution: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    distribution.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
    });
    distribution
}

/// Buckets issue/return counts by abbreviated month name, Jan..Dec order.
///
/// Issues bucket on `issue_date`; returns bucket on `return_date`,
/// falling back to `issue_date` for legacy rows without one.
pub fn monthly_activity(records: &[TransactionRecord]) -> Vec<MonthlyActivity> {
    let mut buckets: [Option<MonthlyActivity>; 12] = [None; 12];

    for record in records {
        let relevant_date = match record.kind {
            TransactionKind::Issue => record.issue_date,
            TransactionKind::Return => record.return_date.unwrap_or(record.issue_date),
        };
        let index = month_index(relevant_date);
        let bucket = buckets[index].get_or_insert(MonthlyActivity {
            month: MONTH_ORDER[index],
            issued: 0,
            returned: 0,
        });
        match record.kind {
            TransactionKind::Issue => bucket.issued += 1,
            TransactionKind::Return => bucket.returned += 1,
        }
    }

    buckets.into_iter().flatten().collect()
}

/// Top members by issue-transaction count, descending, at most `limit`.
///
/// Entries whose member has been deleted are dropped after ranking, so
/// they still consume slots.
pub fn top_members(
    records: &[TransactionRecord],
    members: &[Member],
    limit: usize,
) -> Vec<MemberActivity> {
    let ranked = ranked_issue_counts(records, |record| record.member_uuid, limit);
    ranked
        .into_iter()
        .filter_map(|(id, count)| {
            members
                .iter()
                .find(|member| member.uuid == id)
                .map(|member| MemberActivity {
                    member: member.clone(),
                    transactions: count,
                })
        })
        .collect()
}

/// Most issued books, descending, at most `limit`.
///
/// Entries whose book has been deleted are dropped after ranking, so
/// they still consume slots.
pub fn popular_books(
    records: &[TransactionRecord],
    books: &[Book],
    limit: usize,
) -> Vec<BookPopularity> {
    let ranked = ranked_issue_counts(records, |record| record.book_uuid, limit);
    ranked
        .into_iter()
        .filter_map(|(id, count)| {
            books.iter().find(|book| book.uuid == id).map(|book| {
                BookPopularity {
                    book: book.clone(),
                    issues: count,
                }
            })
        })
        .collect()
}

/// Headline dashboard numbers.
pub fn dashboard_stats(
    books: &[Book],
    members: &[Member],
    records: &[TransactionRecord],
    today: NaiveDate,
) -> DashboardStats {
    DashboardStats {
        total_books: books.len(),
        active_members: members.iter().filter(|member| member.is_active()).count(),
        books_issued: records
            .iter()
            .filter(|record| record.status == TransactionStatus::Active)
            .count(),
        estimated_fines: outstanding_fines(records, today),
    }
}

/// Newest `limit` records; input is already newest-first.
pub fn recent_activity(records: &[TransactionRecord], limit: usize) -> &[TransactionRecord] {
    &records[..records.len().min(limit)]
}

/// Applies the transactions-screen search and filters.
pub fn filter_records<'a>(
    records: &'a [TransactionRecord],
    filter: &RecordFilter,
) -> Vec<&'a TransactionRecord> {
    let needle = filter.search.to_lowercase();
    records
        .iter()
        .filter(|record| {
            if let Some(kind) = filter.kind {
                if record.kind != kind {
                    return false;
                }
            }
            if let Some(status) = filter.status {
                if record.status != status {
                    return false;
                }
            }
            if needle.is_empty() {
                return true;
            }
            let title = record.book_title.as_deref().unwrap_or_default();
            let name = record.member_name.as_deref().unwrap_or_default();
            let isbn = record.book_isbn.as_deref().unwrap_or_default();
            title.to_lowercase().contains(&needle)
                || name.to_lowercase().contains(&needle)
                || isbn.contains(needle.as_str())
        })
        .collect()
}

fn month_index(date: NaiveDate) -> usize {
    date.month0() as usize
}

/// Counts issue-kind records per key, ranks descending (uuid ascending
/// as tie-break for determinism) and truncates to `limit`.
fn ranked_issue_counts(
    records: &[TransactionRecord],
    key: impl Fn(&TransactionRecord) -> Uuid,
    limit: usize,
) -> Vec<(Uuid, u32)> {
    let mut counts: HashMap<Uuid, u32> = HashMap::new();
    for record in records {
        if record.kind == TransactionKind::Issue {
            *counts.entry(key(record)).or_default() += 1;
        }
    }

    let mut ranked: Vec<(Uuid, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::{category_distribution, filter_records, monthly_activity, RecordFilter};
    use crate::model::book::Book;
    use crate::model::transaction::{TransactionKind, TransactionStatus};
    use crate::repo::transaction_repo::TransactionRecord;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(kind: TransactionKind, issued: NaiveDate, returned: Option<NaiveDate>) -> TransactionRecord {
        TransactionRecord {
            uuid: Uuid::new_v4(),
            book_uuid: Uuid::new_v4(),
            member_uuid: Uuid::new_v4(),
            kind,
            issue_date: issued,
            due_date: issued + chrono::Days::new(14),
            return_date: returned,
            status: match kind {
                TransactionKind::Issue => TransactionStatus::Active,
                TransactionKind::Return => TransactionStatus::Returned,
            },
            fine: None,
            book_title: Some("Dune".to_string()),
            book_isbn: Some("978-0441172719".to_string()),
            member_name: Some("Ada Lovelace".to_string()),
            member_email: Some("ada@example.com".to_string()),
        }
    }

    #[test]
    fn categories_count_and_order_deterministically() {
        let books = vec![
            Book::new("A", "x", "1", "Fiction", 1),
            Book::new("B", "y", "2", "Fiction", 1),
            Book::new("C", "z", "3", "Science", 1),
        ];
        let distribution = category_distribution(&books);
        assert_eq!(distribution.len(), 2);
        assert_eq!(distribution[0].category, "Fiction");
        assert_eq!(distribution[0].count, 2);
        assert_eq!(distribution[1].category, "Science");
        assert_eq!(distribution[1].count, 1);
    }

    #[test]
    fn monthly_buckets_follow_calendar_order() {
        let records = vec![
            record(TransactionKind::Issue, date(2024, 3, 10), None),
            record(TransactionKind::Issue, date(2024, 1, 5), None),
            record(
                TransactionKind::Return,
                date(2024, 1, 2),
                Some(date(2024, 3, 20)),
            ),
        ];
        let activity = monthly_activity(&records);
        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].month, "Jan");
        assert_eq!(activity[0].issued, 1);
        assert_eq!(activity[1].month, "Mar");
        assert_eq!(activity[1].issued, 1);
        assert_eq!(activity[1].returned, 1);
    }

    #[test]
    fn return_without_return_date_buckets_on_issue_date() {
        let records = vec![record(TransactionKind::Return, date(2024, 2, 1), None)];
        let activity = monthly_activity(&records);
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].month, "Feb");
        assert_eq!(activity[0].returned, 1);
    }

    #[test]
    fn search_matches_title_case_insensitively() {
        let records = vec![record(TransactionKind::Issue, date(2024, 1, 1), None)];
        let hits = filter_records(
            &records,
            &RecordFilter {
                search: "dUnE".to_string(),
                ..RecordFilter::default()
            },
        );
        assert_eq!(hits.len(), 1);

        let misses = filter_records(
            &records,
            &RecordFilter {
                search: "solaris".to_string(),
                ..RecordFilter::default()
            },
        );
        assert!(misses.is_empty());
    }

    #[test]
    fn status_filter_excludes_other_states() {
        let records = vec![
            record(TransactionKind::Issue, date(2024, 1, 1), None),
            record(
                TransactionKind::Return,
                date(2024, 1, 2),
                Some(date(2024, 1, 9)),
            ),
        ];
        let hits = filter_records(
            &records,
            &RecordFilter {
                status: Some(TransactionStatus::Returned),
                ..RecordFilter::default()
            },
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, TransactionKind::Return);
    }
}
