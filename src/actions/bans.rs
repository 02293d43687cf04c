//! Ban helpers.
//!
//! Guards against banning yourself, the bot or the guild owner, records the
//! ban with the caller's ledger, and reports the outcome in the channel.

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::degradation::DegradationMode;
use crate::error::{Error, Result};
use crate::messages::send_message;
use crate::permissions;
use crate::platform::{Channel, Guild, Interaction, PlatformError, UserRef};

/// Persistent record of bans, owned by the caller.
#[async_trait]
pub trait BanLedger: Send + Sync {
    async fn add_ban(
        &self,
        user_id: u64,
        guild_id: u64,
        reason: &str,
        moderator: &str,
    ) -> anyhow::Result<()>;
}

/// Why a ban request was refused before reaching the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanRejection {
    NotInGuild,
    UserNotFound,
    SelfBan,
    BotBan,
    OwnerBan,
}

impl BanRejection {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotInGuild => "This command can only be used in a server",
            Self::UserNotFound => {
                "User not found, bot may not be able to fetch user or an invalid id was provided."
            }
            Self::SelfBan => "You can't ban yourself",
            Self::BotBan => "I can't ban myself",
            Self::OwnerBan => "You can't ban the owner of the server",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BanOutcome {
    Banned,
    Rejected(BanRejection),
}

/// Ban types that suppress the DM to the banned user.
const SILENT_BAN_TYPES: [&str; 2] = ["[silent]", "[hidden]"];

/// Options for [`ban_member`].
#[derive(Debug, Clone)]
pub struct BanRequest<'a> {
    pub user: &'a UserRef,
    pub moderator: &'a UserRef,
    pub reason: &'a str,
    pub delete_message_days: u8,
    pub inform: bool,
}

/// Validate and execute a ban triggered by `interaction`.
///
/// `ban_type` is prefixed to the reason; `[silent]` and `[hidden]` bans do
/// not inform the user. `clean` deletes one day of the user's messages.
pub async fn ban_user<I, L>(
    interaction: &I,
    user: Option<&UserRef>,
    ban_type: &str,
    reason: &str,
    ledger: &L,
    inform: bool,
    clean: bool,
) -> Result<BanOutcome>
where
    I: Interaction,
    L: BanLedger + ?Sized,
{
    let channel = interaction.channel();

    let Some(guild) = interaction.guild() else {
        return reject(channel, BanRejection::NotInGuild).await;
    };
    let Some(user) = user else {
        return reject(channel, BanRejection::UserNotFound).await;
    };
    if user.id == interaction.user().id {
        return reject(channel, BanRejection::SelfBan).await;
    }
    if user.id == interaction.bot_id() {
        return reject(channel, BanRejection::BotBan).await;
    }
    if user.id == guild.owner_id() {
        return reject(channel, BanRejection::OwnerBan).await;
    }

    let inform = inform && !SILENT_BAN_TYPES.contains(&ban_type);
    let reason = format!("{ban_type}{reason}");
    let request = BanRequest {
        user,
        moderator: interaction.user(),
        reason: &reason,
        delete_message_days: u8::from(clean),
        inform,
    };

    ban_member(guild, channel, ledger, &request).await?;
    Ok(BanOutcome::Banned)
}

async fn reject<C: Channel>(channel: Option<&C>, rejection: BanRejection) -> Result<BanOutcome> {
    debug!(?rejection, "Ban rejected");
    send_message(channel, Some(rejection.message()), DegradationMode::Error).await?;
    Ok(BanOutcome::Rejected(rejection))
}

/// Record and execute a ban, then report it in `channel`.
///
/// A platform refusal is reported in the channel and surfaced as
/// `Error::NoPermission` for `ban_members` in the guild scope.
pub async fn ban_member<G, L>(
    guild: &G,
    channel: Option<&G::Channel>,
    ledger: &L,
    request: &BanRequest<'_>,
) -> Result<()>
where
    G: Guild,
    L: BanLedger + ?Sized,
{
    let user = request.user;

    ledger
        .add_ban(user.id, guild.id(), request.reason, &request.moderator.name)
        .await
        .map_err(Error::BanLog)?;

    match guild
        .ban(user.id, request.reason, request.delete_message_days)
        .await
    {
        Ok(()) => {}
        Err(PlatformError::Forbidden(_)) => {
            let notice = format!(
                "Missing permission to ban user {}({}). Check permissions: ban_members or if the bot is higher in the hierarchy than the user.",
                user.name, user.id
            );
            error!(guild = %guild.name(), user = user.id, "{notice}");
            if let Err(e) = send_message(channel, Some(&notice), DegradationMode::Ignore).await {
                debug!(error = %e, "Could not report ban failure");
            }
            let scope = guild.scope();
            return Err(Error::NoPermission {
                context: "Missing permission to ban user".to_string(),
                scope: scope.to_string(),
                missing: permissions::missing(&scope, "ban_members"),
            });
        }
        Err(e) => return Err(e.into()),
    }

    info!(guild = %guild.name(), user = user.id, moderator = %request.moderator.name, "Member banned");

    let summary = format!(
        "{} ({}) banned!\n{}\nModerator: {}, was the user informed? {}",
        user.name,
        user.id,
        request.reason,
        request.moderator.name,
        if request.inform { "Yes" } else { "No" }
    );
    send_message(channel, Some(&summary), DegradationMode::Error).await?;

    if request.inform {
        dm_user(guild, user, request.reason).await;
    }

    Ok(())
}

/// Tell `user` why they were banned. Closed DMs are ignored; other
/// failures are logged.
pub async fn dm_user<G: Guild>(guild: &G, user: &UserRef, reason: &str) {
    let text = format!("You have been banned from {} for `{reason}`", guild.name());
    match guild.direct_message(user.id, &text).await {
        Ok(()) => {}
        Err(PlatformError::Forbidden(_)) => {
            debug!(user = user.id, "Banned user has DMs closed");
        }
        Err(e) => {
            warn!(user = user.id, error = %e, "Could not DM banned user");
        }
    }
}
