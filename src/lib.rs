//! Guildkit - helpers for Discord bots
//!
//! Thin guard-and-delegate wrappers around a chat-platform client: sending
//! messages, checking permissions, banning members, managing invites and
//! channels.
//!
//! ## Architecture
//!
//! - `permissions` - Permission vocabulary and gap checks against a snapshot
//! - `degradation` - Error / warn / ignore policy for permission gaps
//! - `messages` - Chunked sends, interaction responses, reply prompts
//! - `actions` - Bans, invites, channel management
//! - `platform` - Collaborator traits (serenity-backed with `discord`)
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber bootstrap

pub mod actions;
pub mod config;
pub mod degradation;
pub mod error;
pub mod logging;
pub mod messages;
pub mod permissions;
pub mod platform;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use degradation::DegradationMode;
pub use error::{Error, Result};
