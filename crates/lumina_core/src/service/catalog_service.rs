//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide book add/update/remove/list entry points for core callers.
//! - Apply creation defaults: every copy available, fallback cover URL.
//!
//! # Invariants
//! - A new entry always starts with `available = quantity`.
//! - Direct edits pass through record validation; `available` can never
//!   be edited above `quantity`.

use crate::model::account::AccountId;
use crate::model::book::{Book, BookId};
use crate::repo::book_repo::{BookListQuery, BookRepository};
use crate::repo::{RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input for adding a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub quantity: u32,
    /// Uploaded cover URL; falls back to the stock cover when `None`.
    pub cover_url: Option<String>,
    /// Acting account recorded as the entry's owner.
    pub owner_account: Option<AccountId>,
}

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogError {
    BookNotFound(BookId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BookNotFound(id) => write!(f, "book not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent catalog state: {details}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::BookNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Catalog service facade over a book repository.
pub struct CatalogService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a catalog entry with every copy available.
    pub fn add_book(&self, new_book: NewBook) -> Result<Book, CatalogError> {
        let mut book = Book::new(
            new_book.title,
            new_book.author,
            new_book.isbn,
            new_book.category,
            new_book.quantity,
        );
        if let Some(cover_url) = new_book.cover_url {
            book.cover_url = Some(cover_url);
        }
        book.owner_account = new_book.owner_account;

        let id = self.repo.create_book(&book)?;
        self.repo
            .get_book(id)?
            .ok_or(CatalogError::InconsistentState(
                "created book not found in read-back",
            ))
    }

    /// Replaces a catalog entry wholesale after validation.
    pub fn update_book(&self, book: &Book) -> Result<Book, CatalogError> {
        self.repo.update_book(book)?;
        self.repo
            .get_book(book.uuid)?
            .ok_or(CatalogError::InconsistentState(
                "updated book not found in read-back",
            ))
    }

    /// Hard-deletes a catalog entry. Loan history referencing it is left
    /// in place.
    pub fn remove_book(&self, id: BookId) -> Result<(), CatalogError> {
        self.repo.delete_book(id)?;
        Ok(())
    }

    pub fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        self.repo.get_book(id)
    }

    /// Lists catalog entries, newest first.
    pub fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        self.repo.list_books(query)
    }
}
