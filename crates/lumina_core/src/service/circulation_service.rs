//! Issue/return circulation service.
//!
//! # Responsibility
//! - Drive the issuance and return state machine across the book and
//!   transaction repositories.
//! - Resolve books/members for the administrative and self-service paths.
//!
//! # Invariants
//! - A copy is reserved (conditional decrement) before the transaction
//!   row is inserted; a failed insert hands the copy back.
//! - A copy is released only after a successful `active -> returned`
//!   transition, so repeated return attempts never inflate availability.

use crate::model::account::AccountId;
use crate::model::book::BookId;
use crate::model::member::MemberId;
use crate::model::transaction::{Transaction, TransactionId};
use crate::repo::book_repo::BookRepository;
use crate::repo::member_repo::MemberRepository;
use crate::repo::transaction_repo::{
    TransactionListQuery, TransactionRecord, TransactionRepository,
};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Administrative issuance request: book and member are resolved by
/// title+ISBN and name+email instead of ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub book_title: String,
    pub book_isbn: String,
    pub member_name: String,
    pub member_email: String,
}

/// Service error for circulation use-cases.
#[derive(Debug)]
pub enum CirculationError {
    /// Zero or ambiguous catalog matches, or the book id does not exist.
    BookNotFound(String),
    /// Zero or ambiguous registry matches, or no member is linked to the
    /// acting account.
    MemberNotFound(String),
    /// Every copy is currently on loan.
    BookUnavailable(BookId),
    TransactionNotFound(TransactionId),
    /// The transaction has already left the `active` state.
    AlreadyReturned(TransactionId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for CirculationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BookNotFound(detail) => write!(f, "book not found: {detail}"),
            Self::MemberNotFound(detail) => write!(f, "member not found: {detail}"),
            Self::BookUnavailable(id) => write!(f, "book {id} has no available copies"),
            Self::TransactionNotFound(id) => write!(f, "transaction not found: {id}"),
            Self::AlreadyReturned(id) => {
                write!(f, "transaction {id} has already been returned")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent circulation state: {details}")
            }
        }
    }
}

impl Error for CirculationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CirculationError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Circulation service facade over the book, member, and transaction
/// repositories.
pub struct CirculationService<B, M, T> {
    books: B,
    members: M,
    transactions: T,
}

impl<B, M, T> CirculationService<B, M, T>
where
    B: BookRepository,
    M: MemberRepository,
    T: TransactionRepository,
{
    pub fn new(books: B, members: M, transactions: T) -> Self {
        Self {
            books,
            members,
            transactions,
        }
    }

    /// Issues a book on behalf of a member (administrative path).
    ///
    /// # Contract
    /// - Book resolves by case-insensitive title + exact ISBN; member by
    ///   case-insensitive name + exact email.
    /// - Zero or ambiguous matches fail without touching availability.
    /// - `due_date = today + 14 days`, fixed policy.
    pub fn issue_book(
        &self,
        request: &IssueRequest,
        today: NaiveDate,
    ) -> Result<Transaction, CirculationError> {
        let mut books = self
            .books
            .find_by_title_and_isbn(&request.book_title, &request.book_isbn)?;
        let book = match books.len() {
            1 => books.remove(0),
            0 => {
                return Err(CirculationError::BookNotFound(format!(
                    "no book matches title `{}` and ISBN `{}`",
                    request.book_title, request.book_isbn
                )))
            }
            _ => {
                return Err(CirculationError::BookNotFound(format!(
                    "multiple books match title `{}` and ISBN `{}`",
                    request.book_title, request.book_isbn
                )))
            }
        };

        let mut members = self
            .members
            .find_by_name_and_email(&request.member_name, &request.member_email)?;
        let member = match members.len() {
            1 => members.remove(0),
            0 => {
                return Err(CirculationError::MemberNotFound(format!(
                    "no member matches name `{}` and email `{}`",
                    request.member_name, request.member_email
                )))
            }
            _ => {
                return Err(CirculationError::MemberNotFound(format!(
                    "multiple members match name `{}` and email `{}`",
                    request.member_name, request.member_email
                )))
            }
        };

        self.issue_copy(book.uuid, member.uuid, today)
    }

    /// Issues a book to the member linked to the acting account
    /// (self-service path).
    pub fn borrow_book(
        &self,
        account: AccountId,
        book: BookId,
        today: NaiveDate,
    ) -> Result<Transaction, CirculationError> {
        let member = self.members.find_by_account(account)?.ok_or_else(|| {
            CirculationError::MemberNotFound(format!(
                "no member profile linked to account {account}"
            ))
        })?;

        self.issue_copy(book, member.uuid, today)
    }

    /// Returns a book by transitioning its transaction in place.
    ///
    /// # Contract
    /// - Only `active` transactions can transition; a second return
    ///   attempt fails with [`CirculationError::AlreadyReturned`] and
    ///   availability is untouched.
    pub fn return_book(
        &self,
        id: TransactionId,
        today: NaiveDate,
    ) -> Result<Transaction, CirculationError> {
        if !self.transactions.mark_returned(id, today)? {
            return Err(match self.transactions.get_transaction(id)? {
                None => CirculationError::TransactionNotFound(id),
                Some(_) => CirculationError::AlreadyReturned(id),
            });
        }

        let tx = self
            .transactions
            .get_transaction(id)?
            .ok_or(CirculationError::InconsistentState(
                "returned transaction not found in read-back",
            ))?;

        if !self.books.release_copy(tx.book_uuid)? {
            // Book deleted or stock already full; the return itself stands.
            warn!(
                "event=copy_release module=circulation status=skipped transaction={} book={}",
                tx.uuid, tx.book_uuid
            );
        }

        info!(
            "event=book_returned module=circulation status=ok transaction={} book={}",
            tx.uuid, tx.book_uuid
        );
        Ok(tx)
    }

    /// Lists joined transaction records, newest first.
    pub fn list_records(&self, query: &TransactionListQuery) -> RepoResult<Vec<TransactionRecord>> {
        self.transactions.list_records(query)
    }

    fn issue_copy(
        &self,
        book: BookId,
        member: MemberId,
        today: NaiveDate,
    ) -> Result<Transaction, CirculationError> {
        if !self.books.reserve_copy(book)? {
            return Err(match self.books.get_book(book)? {
                Some(_) => CirculationError::BookUnavailable(book),
                None => {
                    CirculationError::BookNotFound(format!("no catalog entry with id {book}"))
                }
            });
        }

        let tx = Transaction::issue(book, member, today);
        match self.transactions.insert_transaction(&tx) {
            Ok(_) => {
                info!(
                    "event=book_issued module=circulation status=ok transaction={} book={} member={} due={}",
                    tx.uuid, book, member, tx.due_date
                );
                Ok(tx)
            }
            Err(err) => {
                // Hand the reserved copy back before surfacing the failure.
                if let Err(release_err) = self.books.release_copy(book) {
                    warn!(
                        "event=copy_release module=circulation status=error book={} error={}",
                        book, release_err
                    );
                }
                Err(err.into())
            }
        }
    }
}
