//! Application layer services implementing business logic.
//!
//! Services consume repository and cache traits and provide a clean API for
//! HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::resolver::RedirectResolver`] - Cached slug resolution
//! - [`services::admin_service::AdminService`] - Slug mutations with cache invalidation
pub mod services;
