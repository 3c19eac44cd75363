use lumina_core::db::migrations::{apply_migrations, latest_version};
use lumina_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;
use std::collections::HashSet;

fn table_names(conn: &Connection) -> HashSet<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type IN ('table', 'view');")
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .map(|name| name.unwrap())
        .collect();
    names
}

#[test]
fn fresh_database_has_full_schema() {
    let conn = open_db_in_memory().unwrap();

    let names = table_names(&conn);
    assert!(names.contains("accounts"));
    assert!(names.contains("books"));
    assert!(names.contains("members"));
    assert!(names.contains("transactions"));
    assert!(names.contains("transactions_view"));
}

#[test]
fn user_version_matches_latest_migration() {
    let conn = open_db_in_memory().unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn reopening_a_database_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lumina.db");

    {
        let conn = open_db(&path).unwrap();
        conn.execute(
            "INSERT INTO books (uuid, title, author, isbn, category, quantity, available)
             VALUES ('00000000-0000-0000-0000-000000000001', 'Dune', 'Herbert', '1', 'Fiction', 2, 2);",
            [],
        )
        .unwrap();
    }

    let conn = open_db(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn newer_schema_version_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version() + 1))
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } if db_version == latest_version() + 1 && latest_supported == latest_version()
    ));
}

#[test]
fn availability_check_constraint_is_enforced() {
    let conn = open_db_in_memory().unwrap();

    let result = conn.execute(
        "INSERT INTO books (uuid, title, author, isbn, category, quantity, available)
         VALUES ('00000000-0000-0000-0000-000000000002', 'Dune', 'Herbert', '1', 'Fiction', 1, 2);",
        [],
    );
    assert!(result.is_err());
}
