//! Invite helpers.

use std::fmt;
use std::time::Duration;

use tracing::{error, info, warn};
use url::Url;

use crate::error::Result;
use crate::permissions;
use crate::platform::{Channel, Guild, PlatformError};

/// Default invite lifetime: one week.
pub const DEFAULT_INVITE_MAX_AGE: Duration = Duration::from_secs(604_800);

const INVITE_HOSTS: [&str; 3] = ["discord.gg", "discord.com", "discordapp.com"];

/// Permissions needed to create an invite in a channel.
const INVITE_PERMISSIONS: [&str; 2] = ["view_channel", "create_instant_invite"];

/// Extract the invite code from an invite URL. Bare codes pass through.
///
/// ```
/// use guildkit::actions::extract_invite_code;
///
/// assert_eq!(extract_invite_code("https://discord.gg/abcDEF12"), "abcDEF12");
/// assert_eq!(extract_invite_code("abcDEF12"), "abcDEF12");
/// ```
pub fn extract_invite_code(input: &str) -> &str {
    let input = input.trim();

    let Some(host) = Url::parse(input)
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .or_else(|| {
            // Scheme-less links such as "discord.gg/abc".
            let host = input.split('/').next()?;
            INVITE_HOSTS
                .contains(&host.to_lowercase().as_str())
                .then(|| host.to_lowercase())
        })
    else {
        return input;
    };

    let host = host.strip_prefix("www.").unwrap_or(&host);
    if !INVITE_HOSTS.contains(&host) {
        return input;
    }

    input
        .split(['?', '#'])
        .next()
        .and_then(|path| path.trim_end_matches('/').rsplit('/').next())
        .filter(|code| !code.is_empty())
        .unwrap_or(input)
}

/// Outcome of looking up a usable invite for a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteLookup {
    Url(String),
    /// The bot may neither create nor list invites.
    Forbidden,
    NoInvites,
    Failed(String),
}

impl InviteLookup {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }
}

impl fmt::Display for InviteLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Forbidden => f.write_str("forbidden"),
            Self::NoInvites => f.write_str("no invites available"),
            Self::Failed(_) => f.write_str("error creating invite"),
        }
    }
}

/// Create an invite in `channel` and return its URL.
pub async fn create_invite<C: Channel>(channel: &C, reason: &str, max_age: Duration) -> Result<String> {
    channel.create_invite(max_age, reason).await.map_err(|e| {
        warn!(channel = %channel.name(), error = %e, "Error creating invite");
        e.into()
    })
}

/// Find a working invite for `guild`.
///
/// Keeps `current` if it still resolves. Otherwise creates a new invite in
/// the first channel where the bot may, and finally falls back to the first
/// existing invite.
pub async fn check_guild_invites<G: Guild>(
    guild: &G,
    current: Option<&str>,
    max_age: Duration,
) -> InviteLookup {
    if let Some(current) = current {
        match guild.fetch_invite(extract_invite_code(current)).await {
            Ok(()) => return InviteLookup::Url(current.to_string()),
            Err(_) => info!(guild = %guild.name(), "Invite expired, creating a new one"),
        }
    }

    for channel in guild.channels() {
        if !permissions::missing(&channel.scope(), INVITE_PERMISSIONS).is_empty() {
            continue;
        }
        match channel
            .create_invite(max_age, "Missing Invite/Invalid invite, making a new one.")
            .await
        {
            Ok(url) => return InviteLookup::Url(url),
            Err(PlatformError::NotFound(_)) => continue,
            Err(PlatformError::Forbidden(_)) => {
                info!(guild = %guild.name(), "No permission to create invites");
                break;
            }
            Err(e) => warn!(channel = %channel.name(), error = %e, "Error creating invite"),
        }
    }

    match guild.invites().await {
        Ok(invites) => match invites.into_iter().next() {
            Some(url) => InviteLookup::Url(url),
            None => {
                info!(guild = %guild.name(), "Guild has no invites");
                InviteLookup::NoInvites
            }
        },
        Err(PlatformError::Forbidden(_)) => {
            info!(guild = %guild.name(), "No permission to fetch invites");
            InviteLookup::Forbidden
        }
        Err(e) => {
            error!(guild = %guild.name(), error = %e, "Error creating invite");
            InviteLookup::Failed(e.to_string())
        }
    }
}
