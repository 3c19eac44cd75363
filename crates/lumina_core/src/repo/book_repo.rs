//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide catalog CRUD and lookup over the `books` table.
//! - Own copy reservation/release as atomic conditional updates.
//!
//! # Invariants
//! - `reserve_copy` decrements `available` only when it is strictly
//!   positive, in one statement; the caller never observes an
//!   intermediate state.
//! - `release_copy` increments `available` only while it is below
//!   `quantity`, so repeated releases cannot overshoot.

use crate::model::book::{Book, BookId};
use crate::repo::{parse_count, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const BOOK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    author,
    isbn,
    category,
    quantity,
    available,
    cover_url,
    owner_account
FROM books";

/// Query options for listing catalog entries.
#[derive(Debug, Clone, Default)]
pub struct BookListQuery {
    /// Optional exact category filter.
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for catalog operations.
pub trait BookRepository {
    fn create_book(&self, book: &Book) -> RepoResult<BookId>;
    fn update_book(&self, book: &Book) -> RepoResult<()>;
    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>>;
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    fn delete_book(&self, id: BookId) -> RepoResult<()>;
    /// Case-insensitive title + exact ISBN lookup. Returns at most two
    /// rows so callers can distinguish a unique match from an ambiguous
    /// one.
    fn find_by_title_and_isbn(&self, title: &str, isbn: &str) -> RepoResult<Vec<Book>>;
    /// Atomically claims one available copy. Returns `false` when no row
    /// changed, i.e. the book is missing or has no available copy.
    fn reserve_copy(&self, id: BookId) -> RepoResult<bool>;
    /// Atomically hands one copy back. Returns `false` when no row
    /// changed, i.e. the book is missing or already fully stocked.
    fn release_copy(&self, id: BookId) -> RepoResult<bool>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, book: &Book) -> RepoResult<BookId> {
        book.validate()?;

        self.conn.execute(
            "INSERT INTO books (
                uuid,
                title,
                author,
                isbn,
                category,
                quantity,
                available,
                cover_url,
                owner_account
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                book.uuid.to_string(),
                book.title.as_str(),
                book.author.as_str(),
                book.isbn.as_str(),
                book.category.as_str(),
                i64::from(book.quantity),
                i64::from(book.available),
                book.cover_url.as_deref(),
                book.owner_account.map(|id| id.to_string()),
            ],
        )?;

        Ok(book.uuid)
    }

    fn update_book(&self, book: &Book) -> RepoResult<()> {
        book.validate()?;

        let changed = self.conn.execute(
            "UPDATE books
             SET
                title = ?1,
                author = ?2,
                isbn = ?3,
                category = ?4,
                quantity = ?5,
                available = ?6,
                cover_url = ?7,
                owner_account = ?8
             WHERE uuid = ?9;",
            params![
                book.title.as_str(),
                book.author.as_str(),
                book.isbn.as_str(),
                book.category.as_str(),
                i64::from(book.quantity),
                i64::from(book.available),
                book.cover_url.as_deref(),
                book.owner_account.map(|id| id.to_string()),
                book.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(book.uuid));
        }

        Ok(())
    }

    fn get_book(&self, id: BookId) -> RepoResult<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_book_row(row)?));
        }

        Ok(None)
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let mut sql = format!("{BOOK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(category) = &query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.clone()));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn find_by_title_and_isbn(&self, title: &str, isbn: &str) -> RepoResult<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BOOK_SELECT_SQL}
             WHERE title = ?1 COLLATE NOCASE
               AND isbn = ?2
             LIMIT 2;"
        ))?;

        let mut rows = stmt.query(params![title, isbn])?;
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }

    fn reserve_copy(&self, id: BookId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE books
             SET available = available - 1
             WHERE uuid = ?1
               AND available > 0;",
            [id.to_string()],
        )?;

        Ok(changed == 1)
    }

    fn release_copy(&self, id: BookId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE books
             SET available = available + 1
             WHERE uuid = ?1
               AND available < quantity;",
            [id.to_string()],
        )?;

        Ok(changed == 1)
    }
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "books.uuid")?;

    let owner_account = match row.get::<_, Option<String>>("owner_account")? {
        Some(value) => Some(parse_uuid(&value, "books.owner_account")?),
        None => None,
    };

    let book = Book {
        uuid,
        title: row.get("title")?,
        author: row.get("author")?,
        isbn: row.get("isbn")?,
        category: row.get("category")?,
        quantity: parse_count(row.get("quantity")?, "books.quantity")?,
        available: parse_count(row.get("available")?, "books.available")?,
        cover_url: row.get("cover_url")?,
        owner_account,
    };
    book.validate()?;
    Ok(book)
}
