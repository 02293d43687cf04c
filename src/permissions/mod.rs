//! Permission-gap checks for the bot.
//!
//! This module answers one question: which of a set of permissions does the
//! bot lack (or hold) in a channel or guild, given a capability snapshot the
//! platform client supplies at query time.
//!
//! ## Features
//!
//! - Fixed vocabulary of permission tokens, including library aliases
//! - Stateless `missing` / `held` checks that keep request order
//! - Token validation for values read from configuration
//!
//! ## Usage
//!
//! ```rust
//! use guildkit::permissions::{self, CapabilitySnapshot, Scope};
//!
//! let scope = Scope::channel(
//!     "#general",
//!     CapabilitySnapshot::from_pairs([("view_channel", true), ("send_messages", false)]),
//! );
//!
//! let missing = permissions::missing(&scope, ["view_channel", "send_messages"]);
//! assert_eq!(missing, vec!["send_messages"]);
//! ```

mod checker;
mod scope;
mod vocabulary;

pub use checker::{Requested, granted_permissions, held, missing};
pub use scope::{CapabilitySnapshot, Scope};
pub use vocabulary::{PERMISSIONS, SEND_PERMISSIONS, bit, is_known, validate};
