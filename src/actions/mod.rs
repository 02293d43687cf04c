//! Moderation and guild management actions.
//!
//! Each helper validates its inputs, delegates to the platform, and turns
//! platform refusals into the crate's error model.

mod bans;
mod channels;
mod invites;

pub use bans::{BanLedger, BanOutcome, BanRejection, BanRequest, ban_member, ban_user, dm_user};
pub use channels::{DEFAULT_DELETE_REASON, create_channel, delete_channel};
pub use invites::{
    DEFAULT_INVITE_MAX_AGE, InviteLookup, check_guild_invites, create_invite, extract_invite_code,
};
