//! HTTP layer translating requests into resolver and admin operations.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Signature verification, HTTPS enforcement and tracing

pub mod dto;
pub mod handlers;
pub mod middleware;
