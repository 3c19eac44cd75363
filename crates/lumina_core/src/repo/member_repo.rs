//! Member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide registry CRUD and lookup over the `members` table.
//!
//! # Invariants
//! - `delete_member` is a hard delete; loan history referencing the
//!   member is left untouched.
//! - `account_uuid` is unique: one sign-in account maps to at most one
//!   member.

use crate::model::member::{Member, MemberId, MemberStatus, MembershipType};
use crate::model::account::AccountId;
use crate::repo::{date_to_db, parse_date, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const MEMBER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    email,
    phone,
    membership_type,
    status,
    join_date,
    avatar_url,
    account_uuid
FROM members";

/// Query options for listing registry entries.
#[derive(Debug, Clone, Default)]
pub struct MemberListQuery {
    /// Optional lifecycle-state filter.
    pub status: Option<MemberStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for member registry operations.
pub trait MemberRepository {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId>;
    fn update_member(&self, member: &Member) -> RepoResult<()>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>>;
    fn set_member_status(&self, id: MemberId, status: MemberStatus) -> RepoResult<()>;
    fn delete_member(&self, id: MemberId) -> RepoResult<()>;
    /// Case-insensitive name + exact email lookup. Returns at most two
    /// rows so callers can distinguish a unique match from an ambiguous
    /// one.
    fn find_by_name_and_email(&self, name: &str, email: &str) -> RepoResult<Vec<Member>>;
    /// Resolves the member linked to a sign-in account, if any.
    fn find_by_account(&self, account: AccountId) -> RepoResult<Option<Member>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId> {
        member.validate()?;

        self.conn.execute(
            "INSERT INTO members (
                uuid,
                name,
                email,
                phone,
                membership_type,
                status,
                join_date,
                avatar_url,
                account_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                member.uuid.to_string(),
                member.name.as_str(),
                member.email.as_str(),
                member.phone.as_str(),
                membership_type_to_db(member.membership_type),
                member_status_to_db(member.status),
                date_to_db(member.join_date),
                member.avatar_url.as_deref(),
                member.account_uuid.map(|id| id.to_string()),
            ],
        )?;

        Ok(member.uuid)
    }

    fn update_member(&self, member: &Member) -> RepoResult<()> {
        member.validate()?;

        let changed = self.conn.execute(
            "UPDATE members
             SET
                name = ?1,
                email = ?2,
                phone = ?3,
                membership_type = ?4,
                status = ?5,
                join_date = ?6,
                avatar_url = ?7,
                account_uuid = ?8
             WHERE uuid = ?9;",
            params![
                member.name.as_str(),
                member.email.as_str(),
                member.phone.as_str(),
                membership_type_to_db(member.membership_type),
                member_status_to_db(member.status),
                date_to_db(member.join_date),
                member.avatar_url.as_deref(),
                member.account_uuid.map(|id| id.to_string()),
                member.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(member.uuid));
        }

        Ok(())
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }

        Ok(None)
    }

    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>> {
        let mut sql = format!("{MEMBER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(member_status_to_db(status).to_string()));
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
        let mut members = Vec::new();

        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }

        Ok(members)
    }

    fn set_member_status(&self, id: MemberId, status: MemberStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE members SET status = ?1 WHERE uuid = ?2;",
            params![member_status_to_db(status), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_member(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn find_by_name_and_email(&self, name: &str, email: &str) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL}
             WHERE name = ?1 COLLATE NOCASE
               AND email = ?2
             LIMIT 2;"
        ))?;

        let mut rows = stmt.query(params![name, email])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }

        Ok(members)
    }

    fn find_by_account(&self, account: AccountId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE account_uuid = ?1;"))?;

        let mut rows = stmt.query([account.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }

        Ok(None)
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "members.uuid")?;

    let type_text: String = row.get("membership_type")?;
    let membership_type = parse_membership_type(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid membership type `{type_text}` in members.membership_type"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_member_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid member status `{status_text}` in members.status"
        ))
    })?;

    let join_text: String = row.get("join_date")?;
    let join_date = parse_date(&join_text, "members.join_date")?;

    let account_uuid = match row.get::<_, Option<String>>("account_uuid")? {
        Some(value) => Some(parse_uuid(&value, "members.account_uuid")?),
        None => None,
    };

    let member = Member {
        uuid,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        membership_type,
        status,
        join_date,
        avatar_url: row.get("avatar_url")?,
        account_uuid,
    };
    member.validate()?;
    Ok(member)
}

fn membership_type_to_db(value: MembershipType) -> &'static str {
    match value {
        MembershipType::Student => "student",
        MembershipType::Faculty => "faculty",
        MembershipType::General => "general",
    }
}

fn parse_membership_type(value: &str) -> Option<MembershipType> {
    match value {
        "student" => Some(MembershipType::Student),
        "faculty" => Some(MembershipType::Faculty),
        "general" => Some(MembershipType::General),
        _ => None,
    }
}

pub(crate) fn member_status_to_db(value: MemberStatus) -> &'static str {
    match value {
        MemberStatus::Active => "active",
        MemberStatus::Inactive => "inactive",
    }
}

fn parse_member_status(value: &str) -> Option<MemberStatus> {
    match value {
        "active" => Some(MemberStatus::Active),
        "inactive" => Some(MemberStatus::Inactive),
        _ => None,
    }
}
