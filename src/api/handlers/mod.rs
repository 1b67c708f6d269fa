//! HTTP request handlers.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod aliases;
pub mod health;
pub mod redirect;
pub mod slack;

pub use aliases::{gib_handler, glitch_handler, vip_handler};
pub use health::{health_handler, ping_handler};
pub use redirect::{redirect_handler, root_redirect_handler};
pub use slack::slack_command_handler;
