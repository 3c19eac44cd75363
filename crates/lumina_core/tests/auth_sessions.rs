use lumina_core::db::open_db_in_memory;
use lumina_core::{
    AuthError, AuthService, LoginGate, NewAccount, Role, Session, SqliteAccountRepository,
};

fn new_account(email: &str, role: Role) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        name: "Ada Lovelace".to_string(),
        password: "correct horse battery staple".to_string(),
        role,
    }
}

#[test]
fn sign_up_then_sign_in_installs_session_identity() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::new(&conn));
    let mut session = Session::new();

    let account = auth
        .sign_up(&new_account("ada@example.com", Role::Member))
        .unwrap();
    let signed_in = auth
        .sign_in(
            &mut session,
            "ada@example.com",
            "correct horse battery staple",
            LoginGate::Member,
        )
        .unwrap();

    assert_eq!(signed_in.uuid, account.uuid);
    assert!(session.is_signed_in());
    let user = session.current_user().unwrap();
    assert_eq!(user.account_id, account.uuid);
    assert_eq!(user.role, Role::Member);
    assert!(!session.is_admin());
}

#[test]
fn stored_credentials_are_hashed_not_plaintext() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::new(&conn));

    auth.sign_up(&new_account("ada@example.com", Role::Member))
        .unwrap();

    let stored: String = conn
        .query_row(
            "SELECT password_hash FROM accounts WHERE email = 'ada@example.com';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_ne!(stored, "correct horse battery staple");
    assert!(stored.starts_with("$2"));
}

#[test]
fn wrong_password_fails_and_leaves_session_empty() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::new(&conn));
    let mut session = Session::new();

    auth.sign_up(&new_account("ada@example.com", Role::Member))
        .unwrap();
    let err = auth
        .sign_in(&mut session, "ada@example.com", "guess", LoginGate::Member)
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials));
    assert!(!session.is_signed_in());
}

#[test]
fn unknown_email_fails_identically_to_wrong_password() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::new(&conn));
    let mut session = Session::new();

    let err = auth
        .sign_in(
            &mut session,
            "nobody@example.com",
            "anything",
            LoginGate::Member,
        )
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[test]
fn email_lookup_is_case_insensitive() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::new(&conn));
    let mut session = Session::new();

    auth.sign_up(&new_account("ada@example.com", Role::Member))
        .unwrap();
    auth.sign_in(
        &mut session,
        "Ada@Example.COM",
        "correct horse battery staple",
        LoginGate::Member,
    )
    .unwrap();
    assert!(session.is_signed_in());
}

#[test]
fn admin_gate_rejects_member_account_and_signs_session_out() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::new(&conn));
    let mut session = Session::new();

    auth.sign_up(&new_account("ada@example.com", Role::Member))
        .unwrap();

    // Establish an existing identity first; the failed admin attempt must
    // clear it.
    auth.sign_in(
        &mut session,
        "ada@example.com",
        "correct horse battery staple",
        LoginGate::Member,
    )
    .unwrap();
    assert!(session.is_signed_in());

    let err = auth
        .sign_in(
            &mut session,
            "ada@example.com",
            "correct horse battery staple",
            LoginGate::Admin,
        )
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized));
    assert!(!session.is_signed_in());
}

#[test]
fn admin_gate_accepts_admin_account() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::new(&conn));
    let mut session = Session::new();

    auth.sign_up(&new_account("root@example.com", Role::Admin))
        .unwrap();
    auth.sign_in(
        &mut session,
        "root@example.com",
        "correct horse battery staple",
        LoginGate::Admin,
    )
    .unwrap();
    assert!(session.is_admin());
}

#[test]
fn sign_out_clears_the_session() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::new(&conn));
    let mut session = Session::new();

    auth.sign_up(&new_account("ada@example.com", Role::Member))
        .unwrap();
    auth.sign_in(
        &mut session,
        "ada@example.com",
        "correct horse battery staple",
        LoginGate::Member,
    )
    .unwrap();

    auth.sign_out(&mut session);
    assert!(!session.is_signed_in());
    assert!(session.current_user().is_none());
}

#[test]
fn duplicate_account_email_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::new(&conn));

    auth.sign_up(&new_account("ada@example.com", Role::Member))
        .unwrap();
    let err = auth
        .sign_up(&new_account("ada@example.com", Role::Admin))
        .unwrap_err();
    assert!(matches!(err, AuthError::Repo(_)));
}

#[test]
fn get_account_returns_stored_record_without_hash() {
    let conn = open_db_in_memory().unwrap();
    let auth = AuthService::new(SqliteAccountRepository::new(&conn));

    let account = auth
        .sign_up(&new_account("ada@example.com", Role::Member))
        .unwrap();
    let loaded = auth.get_account(account.uuid).unwrap().unwrap();
    assert_eq!(loaded, account);
}
