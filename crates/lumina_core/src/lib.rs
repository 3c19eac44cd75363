//! Core domain logic for Lumina, a library circulation system.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod report;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, AccountId, Role};
pub use model::book::{Book, BookId};
pub use model::member::{Member, MemberId, MemberStatus, MembershipType};
pub use model::transaction::{
    Transaction, TransactionId, TransactionKind, TransactionStatus, LOAN_PERIOD_DAYS,
};
pub use model::ValidationError;
pub use repo::account_repo::{AccountCredentials, AccountRepository, SqliteAccountRepository};
pub use repo::book_repo::{BookListQuery, BookRepository, SqliteBookRepository};
pub use repo::member_repo::{MemberListQuery, MemberRepository, SqliteMemberRepository};
pub use repo::transaction_repo::{
    SqliteTransactionRepository, TransactionListQuery, TransactionRecord, TransactionRepository,
};
pub use repo::{RepoError, RepoResult};
pub use report::fines::FINE_PER_DAY_USD;
pub use service::auth_service::{
    AuthError, AuthService, CurrentUser, LoginGate, NewAccount, Session,
};
pub use service::catalog_service::{CatalogError, CatalogService, NewBook};
pub use service::circulation_service::{CirculationError, CirculationService, IssueRequest};
pub use service::member_service::{MemberService, MemberServiceError, NewMember};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
