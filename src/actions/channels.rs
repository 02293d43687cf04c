//! Channel creation and deletion.

use tracing::{error, info};

use crate::error::Result;
use crate::platform::{Channel, ChannelKind, Guild, PlatformError};

pub const DEFAULT_DELETE_REASON: &str = "Deleted by bot";

/// Create a channel of `kind` in `guild`, optionally under `category`.
pub async fn create_channel<G: Guild>(
    guild: &G,
    name: &str,
    kind: ChannelKind,
    category: Option<u64>,
) -> Result<G::Channel> {
    let channel = guild.create_channel(name, kind, category).await?;
    info!(guild = %guild.name(), channel = name, ?kind, "Channel created");
    Ok(channel)
}

/// Delete `channel`.
///
/// Returns `Ok(false)` when the bot lacks permission; the failure is logged.
pub async fn delete_channel<C: Channel>(channel: &C, reason: Option<&str>) -> Result<bool> {
    match channel.delete(reason.unwrap_or(DEFAULT_DELETE_REASON)).await {
        Ok(()) => Ok(true),
        Err(PlatformError::Forbidden(_)) => {
            error!(
                "Failed to delete channel {}({}): FORBIDDEN",
                channel.name(),
                channel.id()
            );
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
