//! Member registry use-case service.
//!
//! # Responsibility
//! - Provide member registration and lifecycle entry points.
//! - Apply registration defaults: active status, join date, stock avatar.
//!
//! # Invariants
//! - Removal is a hard delete with no cascade; the member's loan history
//!   stays behind with dangling references.

use crate::model::account::AccountId;
use crate::model::member::{Member, MemberId, MemberStatus, MembershipType};
use crate::repo::member_repo::{MemberListQuery, MemberRepository};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input for registering a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub membership_type: MembershipType,
    /// Sign-in account to link for self-service borrowing, if any.
    pub account_uuid: Option<AccountId>,
}

/// Service error for registry use-cases.
#[derive(Debug)]
pub enum MemberServiceError {
    MemberNotFound(MemberId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for MemberServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent registry state: {details}")
            }
        }
    }
}

impl Error for MemberServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MemberServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::MemberNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Registry service facade over a member repository.
pub struct MemberService<R: MemberRepository> {
    repo: R,
}

impl<R: MemberRepository> MemberService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers an active member joining `today`.
    pub fn register_member(
        &self,
        new_member: NewMember,
        today: NaiveDate,
    ) -> Result<Member, MemberServiceError> {
        let mut member = Member::new(
            new_member.name,
            new_member.email,
            new_member.phone,
            new_member.membership_type,
            today,
        );
        member.account_uuid = new_member.account_uuid;

        let id = self.repo.create_member(&member)?;
        self.repo
            .get_member(id)?
            .ok_or(MemberServiceError::InconsistentState(
                "registered member not found in read-back",
            ))
    }

    /// Switches a member between active and inactive.
    pub fn set_member_status(
        &self,
        id: MemberId,
        status: MemberStatus,
    ) -> Result<Member, MemberServiceError> {
        self.repo.set_member_status(id, status)?;
        self.repo
            .get_member(id)?
            .ok_or(MemberServiceError::InconsistentState(
                "member not found after status update",
            ))
    }

    /// Hard-deletes a member; their loan history is left in place.
    pub fn remove_member(&self, id: MemberId) -> Result<(), MemberServiceError> {
        self.repo.delete_member(id)?;
        Ok(())
    }

    pub fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.repo.get_member(id)
    }

    /// Lists registry entries, newest first.
    pub fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>> {
        self.repo.list_members(query)
    }
}
