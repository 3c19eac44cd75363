//! Sign-in service and process-wide session context.
//!
//! # Responsibility
//! - Provide sign-up/sign-in/sign-out over the account repository.
//! - Own the [`Session`] context constructed once at startup and passed
//!   by reference to consumers.
//!
//! # Invariants
//! - An admin-gated sign-in by a non-admin account fails unauthorized
//!   *and clears the session*.
//! - Passwords are stored as bcrypt hashes only; the hash never leaves
//!   the repository boundary.

use crate::model::account::{Account, AccountId, Role};
use crate::repo::account_repo::AccountRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which login surface the credentials were entered on. The admin gate
/// additionally requires the account role to be [`Role::Admin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginGate {
    Member,
    Admin,
}

/// Signed-in identity held by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub account_id: AccountId,
    pub email: String,
    pub role: Role,
}

/// Process-wide "who is logged in" context.
///
/// Constructed once at startup with [`Session::new`] and handed by
/// reference to every consumer; no ambient global state.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<CurrentUser>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|user| user.role == Role::Admin)
    }

    fn set(&mut self, user: CurrentUser) {
        self.current = Some(user);
    }

    fn clear(&mut self) {
        self.current = None;
    }
}

/// Input for creating a sign-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

/// Service error for auth use-cases.
#[derive(Debug)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are not distinguished.
    InvalidCredentials,
    /// Admin gate rejected a non-admin account.
    Unauthorized,
    Hash(bcrypt::BcryptError),
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::Unauthorized => {
                write!(f, "unauthorized access: admin privileges required")
            }
            Self::Hash(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Hash(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(value: bcrypt::BcryptError) -> Self {
        Self::Hash(value)
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Auth service facade over an account repository.
pub struct AuthService<R: AccountRepository> {
    repo: R,
}

impl<R: AccountRepository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an account with a bcrypt-hashed password.
    pub fn sign_up(&self, new_account: &NewAccount) -> Result<Account, AuthError> {
        let password_hash = bcrypt::hash(&new_account.password, bcrypt::DEFAULT_COST)?;
        let account = Account::new(
            new_account.email.clone(),
            new_account.name.clone(),
            new_account.role,
        );
        self.repo.create_account(&account, &password_hash)?;
        Ok(account)
    }

    /// Verifies credentials and installs the identity into `session`.
    ///
    /// # Contract
    /// - [`LoginGate::Admin`] with a non-admin account fails with
    ///   [`AuthError::Unauthorized`] and signs the session out.
    /// - On any failure the session holds no identity.
    pub fn sign_in(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
        gate: LoginGate,
    ) -> Result<Account, AuthError> {
        let credentials = self
            .repo
            .find_by_email(email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(password, &credentials.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let account = credentials.account;
        if gate == LoginGate::Admin && account.role != Role::Admin {
            session.clear();
            info!(
                "event=sign_in module=auth status=unauthorized account={}",
                account.uuid
            );
            return Err(AuthError::Unauthorized);
        }

        session.set(CurrentUser {
            account_id: account.uuid,
            email: account.email.clone(),
            role: account.role,
        });
        info!(
            "event=sign_in module=auth status=ok account={} gate={:?}",
            account.uuid, gate
        );
        Ok(account)
    }

    /// Clears the session identity.
    pub fn sign_out(&self, session: &mut Session) {
        if let Some(user) = session.current_user() {
            info!(
                "event=sign_out module=auth status=ok account={}",
                user.account_id
            );
        }
        session.clear();
    }

    /// Looks up the account record behind a session identity.
    pub fn get_account(&self, id: AccountId) -> Result<Option<Account>, AuthError> {
        Ok(self.repo.get_account(id)?)
    }
}
