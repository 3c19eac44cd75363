//! Transaction repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist issuance rows and the in-place return transition.
//! - Serve the joined `transactions_view` read model for listings.
//!
//! # Invariants
//! - `mark_returned` only transitions rows whose persisted status is
//!   still `active`, in one statement; a second attempt changes nothing.
//! - View reads keep rows with dangling book/member references; the
//!   joined columns come back as `None`.

use crate::model::transaction::{
    Transaction, TransactionId, TransactionKind, TransactionStatus,
};
use crate::model::book::BookId;
use crate::model::member::MemberId;
use crate::repo::{date_to_db, parse_date, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TRANSACTION_SELECT_SQL: &str = "SELECT
    uuid,
    book_uuid,
    member_uuid,
    type,
    issue_date,
    due_date,
    return_date,
    status,
    fine
FROM transactions";

const RECORD_SELECT_SQL: &str = "SELECT
    uuid,
    book_uuid,
    member_uuid,
    type,
    issue_date,
    due_date,
    return_date,
    status,
    fine,
    book_title,
    book_isbn,
    member_name,
    member_email
FROM transactions_view";

/// Joined read model for transaction listings. Book/member columns are
/// `None` when the referenced entity has been deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub uuid: TransactionId,
    pub book_uuid: BookId,
    pub member_uuid: MemberId,
    pub kind: TransactionKind,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    pub fine: Option<f64>,
    pub book_title: Option<String>,
    pub book_isbn: Option<String>,
    pub member_name: Option<String>,
    pub member_email: Option<String>,
}

/// Query options for listing transaction records.
#[derive(Debug, Clone, Default)]
pub struct TransactionListQuery {
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    /// Optional filter to one member's history.
    pub member: Option<MemberId>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for loan transactions.
pub trait TransactionRepository {
    fn insert_transaction(&self, tx: &Transaction) -> RepoResult<TransactionId>;
    fn get_transaction(&self, id: TransactionId) -> RepoResult<Option<Transaction>>;
    /// Lists joined records, newest first.
    fn list_records(&self, query: &TransactionListQuery) -> RepoResult<Vec<TransactionRecord>>;
    /// Transitions an active row to returned, in place. Returns `false`
    /// when no row changed, i.e. the row is missing or not active.
    fn mark_returned(&self, id: TransactionId, return_date: NaiveDate) -> RepoResult<bool>;
}

/// SQLite-backed transaction repository.
pub struct SqliteTransactionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTransactionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TransactionRepository for SqliteTransactionRepository<'_> {
    fn insert_transaction(&self, tx: &Transaction) -> RepoResult<TransactionId> {
        tx.validate()?;

        self.conn.execute(
            "INSERT INTO transactions (
                uuid,
                book_uuid,
                member_uuid,
                type,
                issue_date,
                due_date,
                return_date,
                status,
                fine
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                tx.uuid.to_string(),
                tx.book_uuid.to_string(),
                tx.member_uuid.to_string(),
                kind_to_db(tx.kind),
                date_to_db(tx.issue_date),
                date_to_db(tx.due_date),
                tx.return_date.map(date_to_db),
                status_to_db(tx.status),
                tx.fine,
            ],
        )?;

        Ok(tx.uuid)
    }

    fn get_transaction(&self, id: TransactionId) -> RepoResult<Option<Transaction>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TRANSACTION_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_transaction_row(row)?));
        }

        Ok(None)
    }

    fn list_records(&self, query: &TransactionListQuery) -> RepoResult<Vec<TransactionRecord>> {
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(kind) = query.kind {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(kind_to_db(kind).to_string()));
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status_to_db(status).to_string()));
        }

        if let Some(member) = query.member {
            sql.push_str(" AND member_uuid = ?");
            bind_values.push(Value::Text(member.to_string()));
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
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }

    fn mark_returned(&self, id: TransactionId, return_date: NaiveDate) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE transactions
             SET
                type = 'return',
                status = 'returned',
                return_date = ?1
             WHERE uuid = ?2
               AND status = 'active';",
            params![date_to_db(return_date), id.to_string()],
        )?;

        Ok(changed == 1)
    }
}

fn parse_transaction_row(row: &Row<'_>) -> RepoResult<Transaction> {
    let uuid_text: String = row.get("uuid")?;
    let book_text: String = row.get("book_uuid")?;
    let member_text: String = row.get("member_uuid")?;

    let tx = Transaction {
        uuid: parse_uuid(&uuid_text, "transactions.uuid")?,
        book_uuid: parse_uuid(&book_text, "transactions.book_uuid")?,
        member_uuid: parse_uuid(&member_text, "transactions.member_uuid")?,
        kind: parse_kind_column(row)?,
        issue_date: parse_date_column(row, "issue_date")?,
        due_date: parse_date_column(row, "due_date")?,
        return_date: parse_optional_date_column(row, "return_date")?,
        status: parse_status_column(row)?,
        fine: row.get("fine")?,
    };
    tx.validate()?;
    Ok(tx)
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<TransactionRecord> {
    let uuid_text: String = row.get("uuid")?;
    let book_text: String = row.get("book_uuid")?;
    let member_text: String = row.get("member_uuid")?;

    Ok(TransactionRecord {
        uuid: parse_uuid(&uuid_text, "transactions_view.uuid")?,
        book_uuid: parse_uuid(&book_text, "transactions_view.book_uuid")?,
        member_uuid: parse_uuid(&member_text, "transactions_view.member_uuid")?,
        kind: parse_kind_column(row)?,
        issue_date: parse_date_column(row, "issue_date")?,
        due_date: parse_date_column(row, "due_date")?,
        return_date: parse_optional_date_column(row, "return_date")?,
        status: parse_status_column(row)?,
        fine: row.get("fine")?,
        book_title: row.get("book_title")?,
        book_isbn: row.get("book_isbn")?,
        member_name: row.get("member_name")?,
        member_email: row.get("member_email")?,
    })
}

fn parse_kind_column(row: &Row<'_>) -> RepoResult<TransactionKind> {
    let text: String = row.get("type")?;
    parse_kind(&text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid transaction type `{text}` in type column"))
    })
}

fn parse_status_column(row: &Row<'_>) -> RepoResult<TransactionStatus> {
    let text: String = row.get("status")?;
    parse_status(&text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid transaction status `{text}` in status column"
        ))
    })
}

fn parse_date_column(row: &Row<'_>, column: &'static str) -> RepoResult<NaiveDate> {
    let text: String = row.get(column)?;
    parse_date(&text, column)
}

fn parse_optional_date_column(
    row: &Row<'_>,
    column: &'static str,
) -> RepoResult<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => Ok(Some(parse_date(&text, column)?)),
        None => Ok(None),
    }
}

fn kind_to_db(value: TransactionKind) -> &'static str {
    match value {
        TransactionKind::Issue => "issue",
        TransactionKind::Return => "return",
    }
}

fn parse_kind(value: &str) -> Option<TransactionKind> {
    match value {
        "issue" => Some(TransactionKind::Issue),
        "return" => Some(TransactionKind::Return),
        _ => None,
    }
}

fn status_to_db(value: TransactionStatus) -> &'static str {
    match value {
        TransactionStatus::Active => "active",
        TransactionStatus::Returned => "returned",
        TransactionStatus::Overdue => "overdue",
    }
}

fn parse_status(value: &str) -> Option<TransactionStatus> {
    match value {
        "active" => Some(TransactionStatus::Active),
        "returned" => Some(TransactionStatus::Returned),
        "overdue" => Some(TransactionStatus::Overdue),
        _ => None,
    }
}
