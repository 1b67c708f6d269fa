//! Infrastructure layer for external integrations.
//!
//! Concrete implementations of interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Resolution cache (in-memory and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod persistence;
