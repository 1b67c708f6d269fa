//! Business logic services for the application layer.

pub mod admin_service;
pub mod resolver;

pub use admin_service::AdminService;
pub use resolver::RedirectResolver;
