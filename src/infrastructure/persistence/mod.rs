//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Slug storage, upserts and history
//! - [`PgAccessLogRepository`] - Access logging and click counting

pub mod pg_access_log_repository;
pub mod pg_link_repository;

pub use pg_access_log_repository::PgAccessLogRepository;
pub use pg_link_repository::PgLinkRepository;
