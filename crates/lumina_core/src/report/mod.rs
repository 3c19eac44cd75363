//! Read-time derivations over fetched records.
//!
//! Everything in this module is a pure fold or projection: no storage
//! access, no clock reads. Callers fetch books/members/records through
//! the repositories and pass them in together with the evaluation date.

pub mod fines;
pub mod usage;

pub use fines::{
    days_overdue, display_status, fine_amount, is_overdue, outstanding_fines, overdue_records,
    record_fine, FINE_PER_DAY_USD,
};
pub use usage::{
    category_distribution, dashboard_stats, filter_records, monthly_activity, popular_books,
    recent_activity, top_members, BookPopularity, CategoryCount, DashboardStats, MemberActivity,
    MonthlyActivity, RecordFilter,
};
