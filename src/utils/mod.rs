//! Utility functions for request handling and URL processing.
//!
//! - [`slug`] - Request path to slug normalization
//! - [`query`] - Query string parsing and merging
//! - [`destination`] - Destination parsing, redirect and fallback URLs
//! - [`client`] - Client IP, bot detection and request URL reconstruction
//! - [`slack_signature`] - Slack request signing

pub mod client;
pub mod destination;
pub mod query;
pub mod slack_signature;
pub mod slug;
