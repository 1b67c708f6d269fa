//! HTTP middleware for request processing and protection.
//!
//! Provides Slack signature verification, HTTPS enforcement, and observability
//! middleware.

pub mod force_https;
pub mod slack_signature;
pub mod tracing;
