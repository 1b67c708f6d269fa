//! Core domain entities.
//!
//! - [`LinkRecord`] - A slug mapping
//! - [`LinkHistoryEntry`] - One versioned mutation of a slug
//! - [`NewAccessLog`] - A resolved access to be persisted

pub mod access_log;
pub mod link;

pub use access_log::NewAccessLog;
pub use link::{HistoryAction, LinkHistoryEntry, LinkMutation, LinkRecord, LinkUpsert};
