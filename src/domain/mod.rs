//! Domain layer containing business entities and repository contracts.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`access_event`] - Access logging event model
//! - [`access_worker`] - Asynchronous access log writer
//!
//! # Access Logging Flow
//!
//! 1. Redirect handler resolves a slug
//! 2. [`access_event::AccessEvent`] is sent to a bounded channel (never awaited)
//! 3. [`access_worker::run_access_worker`] persists events with retry
//! 4. The link's click counter is incremented in the same write

pub mod access_event;
pub mod access_worker;
pub mod entities;
pub mod repositories;
