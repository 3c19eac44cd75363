//! Use-case services composing repositories into circulation workflows.
//!
//! Services stay storage-agnostic: they are generic over the repository
//! traits and never touch SQL directly.

pub mod auth_service;
pub mod catalog_service;
pub mod circulation_service;
pub mod member_service;
