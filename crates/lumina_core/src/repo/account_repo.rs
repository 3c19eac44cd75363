//! Account repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist sign-in accounts and serve credential lookups.
//!
//! # Invariants
//! - The bcrypt hash only travels inside [`AccountCredentials`]; the
//!   domain [`Account`] record never carries it.
//! - `email` is unique; duplicate inserts surface the store error.

use crate::model::account::{Account, AccountId, Role};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const ACCOUNT_SELECT_SQL: &str = "SELECT
    uuid,
    email,
    name,
    role,
    password_hash
FROM accounts";

/// Account row including the stored credential hash.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account: Account,
    pub password_hash: String,
}

/// Repository interface for sign-in accounts.
pub trait AccountRepository {
    fn create_account(&self, account: &Account, password_hash: &str) -> RepoResult<AccountId>;
    fn get_account(&self, id: AccountId) -> RepoResult<Option<Account>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<AccountCredentials>>;
}

/// SQLite-backed account repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn create_account(&self, account: &Account, password_hash: &str) -> RepoResult<AccountId> {
        account.validate()?;

        self.conn.execute(
            "INSERT INTO accounts (
                uuid,
                email,
                name,
                role,
                password_hash
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                account.uuid.to_string(),
                account.email.as_str(),
                account.name.as_str(),
                role_to_db(account.role),
                password_hash,
            ],
        )?;

        Ok(account.uuid)
    }

    fn get_account(&self, id: AccountId) -> RepoResult<Option<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_account_row(row)?.account));
        }

        Ok(None)
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<AccountCredentials>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ACCOUNT_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"
        ))?;

        let mut rows = stmt.query([email])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_account_row(row)?));
        }

        Ok(None)
    }
}

fn parse_account_row(row: &Row<'_>) -> RepoResult<AccountCredentials> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "accounts.uuid")?;

    let role_text: String = row.get("role")?;
    let role = parse_role(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in accounts.role"))
    })?;

    let account = Account {
        uuid,
        email: row.get("email")?,
        name: row.get("name")?,
        role,
    };
    account.validate()?;

    Ok(AccountCredentials {
        account,
        password_hash: row.get("password_hash")?,
    })
}

fn role_to_db(value: Role) -> &'static str {
    match value {
        Role::Admin => "admin",
        Role::Member => "member",
    }
}

fn parse_role(value: &str) -> Option<Role> {
    match value {
        "admin" => Some(Role::Admin),
        "member" => Some(Role::Member),
        _ => None,
    }
}
