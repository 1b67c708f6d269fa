//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Slug lookups, upserts, deletes and history
//! - [`AccessLogRepository`] - Access log writes and click counting

pub mod access_log_repository;
pub mod link_repository;

pub use access_log_repository::AccessLogRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use access_log_repository::MockAccessLogRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
