//! Serenity-backed implementations of the platform traits.
//!
//! Build a [`DiscordContext`] from serenity's `Context` and wrap channels,
//! guilds and command interactions with it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::all::{
    Cache, CacheHttp, ChannelId, ChannelType, CommandInteraction, Context, CreateAttachment,
    CreateChannel, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateInvite, CreateMessage, GuildId, Http, Message,
    MessageId, ModelError, ShardMessenger, UserId,
};
use serenity::collector::MessageCollector;
use serenity::http::HttpError;
use tracing::debug;

use super::{
    Attachment, Channel, ChannelKind, Guild, Interaction, OwnerNotifier, PlatformError,
    PlatformMessage, PlatformResult, UserRef,
};
use crate::permissions::{CapabilitySnapshot, Scope};

/// Discord JSON error code for an interaction that was already answered.
const ALREADY_ACKNOWLEDGED: isize = 40060;

/// Map a serenity error onto the platform error model.
fn classify(err: serenity::Error, what: &str) -> PlatformError {
    match &err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => classify_response(
            response.status_code.as_u16(),
            response.error.code,
            &response.error.message,
            what,
        )
        .unwrap_or_else(|| PlatformError::Other(err.to_string())),
        serenity::Error::Model(ModelError::InvalidPermissions { .. }) => {
            PlatformError::Forbidden(format!("{what}: {err}"))
        }
        _ => PlatformError::Other(err.to_string()),
    }
}

/// Classify an unsuccessful HTTP response by status and JSON error code.
fn classify_response(status: u16, code: isize, message: &str, what: &str) -> Option<PlatformError> {
    if code == ALREADY_ACKNOWLEDGED {
        return Some(PlatformError::AlreadyAcknowledged);
    }
    match status {
        403 => Some(PlatformError::Forbidden(format!("{what}: {message}"))),
        404 => Some(PlatformError::NotFound(format!("{what}: {message}"))),
        _ => None,
    }
}

/// Handles every wrapper needs to reach Discord.
#[derive(Clone)]
pub struct DiscordContext {
    pub http: Arc<Http>,
    pub cache: Arc<Cache>,
    pub shard: ShardMessenger,
}

impl DiscordContext {
    pub fn bot_id(&self) -> UserId {
        self.cache.current_user().id
    }
}

impl From<&Context> for DiscordContext {
    fn from(ctx: &Context) -> Self {
        Self {
            http: ctx.http.clone(),
            cache: ctx.cache.clone(),
            shard: ctx.shard.clone(),
        }
    }
}

impl CacheHttp for DiscordContext {
    fn http(&self) -> &Http {
        &self.http
    }

    fn cache(&self) -> Option<&Arc<Cache>> {
        Some(&self.cache)
    }
}

// ----------------------------------------------------------------------------
// Messages
// ----------------------------------------------------------------------------

pub struct DiscordMessage {
    ctx: DiscordContext,
    message: Message,
}

impl DiscordMessage {
    pub fn new(ctx: DiscordContext, message: Message) -> Self {
        Self { ctx, message }
    }

    pub fn inner(&self) -> &Message {
        &self.message
    }
}

#[async_trait]
impl PlatformMessage for DiscordMessage {
    fn id(&self) -> u64 {
        self.message.id.get()
    }

    fn author_id(&self) -> u64 {
        self.message.author.id.get()
    }

    fn content(&self) -> &str {
        &self.message.content
    }

    fn jump_url(&self) -> String {
        self.message.link()
    }

    async fn delete(&self) -> PlatformResult<()> {
        self.message
            .delete(&self.ctx)
            .await
            .map_err(|e| classify(e, "delete message"))
    }
}

// ----------------------------------------------------------------------------
// Channels
// ----------------------------------------------------------------------------

#[derive(Clone)]
pub struct DiscordChannel {
    ctx: DiscordContext,
    id: ChannelId,
    name: String,
    guild_id: Option<GuildId>,
}

impl DiscordChannel {
    pub fn new(ctx: DiscordContext, id: ChannelId, name: impl Into<String>, guild_id: Option<GuildId>) -> Self {
        Self {
            ctx,
            id,
            name: name.into(),
            guild_id,
        }
    }

    fn snapshot(&self) -> CapabilitySnapshot {
        let Some(guild_id) = self.guild_id else {
            return CapabilitySnapshot::empty();
        };
        let bot_id = self.ctx.bot_id();
        let Some(guild) = self.ctx.cache.guild(guild_id) else {
            debug!(guild = %guild_id, "Guild not cached, assuming no permissions");
            return CapabilitySnapshot::empty();
        };
        let channel = guild
            .channels
            .get(&self.id)
            .or_else(|| guild.threads.iter().find(|t| t.id == self.id));
        match (channel, guild.members.get(&bot_id)) {
            (Some(channel), Some(member)) => {
                CapabilitySnapshot::from_bits(guild.user_permissions_in(channel, member).bits())
            }
            _ => {
                debug!(channel = %self.id, "Channel or bot member not cached, assuming no permissions");
                CapabilitySnapshot::empty()
            }
        }
    }
}

#[async_trait]
impl OwnerNotifier for DiscordChannel {
    async fn notify_owner(&self, text: &str) -> PlatformResult<()> {
        let guild_id = self
            .guild_id
            .ok_or_else(|| PlatformError::NotFound(format!("{} has no owning guild", self.name)))?;
        let guild = guild_id
            .to_partial_guild(&self.ctx)
            .await
            .map_err(|e| classify(e, "fetch guild"))?;
        guild
            .owner_id
            .direct_message(&self.ctx, CreateMessage::new().content(text))
            .await
            .map(|_| ())
            .map_err(|e| classify(e, "notify owner"))
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    type Message = DiscordMessage;

    fn id(&self) -> u64 {
        self.id.get()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn scope(&self) -> Scope {
        Scope::channel(self.name.clone(), self.snapshot())
    }

    async fn send(&self, content: &str, attachments: &[Attachment]) -> PlatformResult<DiscordMessage> {
        let files = attachments
            .iter()
            .map(|a| CreateAttachment::bytes(a.data.clone(), a.filename.clone()));
        let builder = CreateMessage::new().content(content).add_files(files);
        self.id
            .send_message(&self.ctx, builder)
            .await
            .map(|m| DiscordMessage::new(self.ctx.clone(), m))
            .map_err(|e| classify(e, "send message"))
    }

    async fn fetch_message(&self, id: u64) -> PlatformResult<DiscordMessage> {
        self.id
            .message(&self.ctx, MessageId::new(id))
            .await
            .map(|m| DiscordMessage::new(self.ctx.clone(), m))
            .map_err(|e| classify(e, "fetch message"))
    }

    async fn wait_for_reply(
        &self,
        author_id: u64,
        timeout: Duration,
    ) -> PlatformResult<Option<DiscordMessage>> {
        let reply = MessageCollector::new(&self.ctx.shard)
            .channel_id(self.id)
            .author_id(UserId::new(author_id))
            .timeout(timeout)
            .next()
            .await;
        Ok(reply.map(|m| DiscordMessage::new(self.ctx.clone(), m)))
    }

    async fn create_invite(&self, max_age: Duration, reason: &str) -> PlatformResult<String> {
        let max_age = u32::try_from(max_age.as_secs()).unwrap_or(u32::MAX);
        self.id
            .create_invite(
                &self.ctx,
                CreateInvite::new().max_age(max_age).audit_log_reason(reason),
            )
            .await
            .map(|invite| invite.url())
            .map_err(|e| classify(e, "create invite"))
    }

    async fn delete(&self, reason: &str) -> PlatformResult<()> {
        self.ctx
            .http
            .delete_channel(self.id, Some(reason))
            .await
            .map(|_| ())
            .map_err(|e| classify(e, "delete channel"))
    }
}

// ----------------------------------------------------------------------------
// Guilds
// ----------------------------------------------------------------------------

#[derive(Clone)]
pub struct DiscordGuild {
    ctx: DiscordContext,
    id: GuildId,
    name: String,
    owner_id: UserId,
}

impl DiscordGuild {
    /// Fetch guild metadata over HTTP.
    pub async fn fetch(ctx: DiscordContext, id: GuildId) -> PlatformResult<Self> {
        let guild = id
            .to_partial_guild(&ctx)
            .await
            .map_err(|e| classify(e, "fetch guild"))?;
        Ok(Self {
            ctx,
            id,
            name: guild.name,
            owner_id: guild.owner_id,
        })
    }
}

#[async_trait]
impl Guild for DiscordGuild {
    type Channel = DiscordChannel;

    fn id(&self) -> u64 {
        self.id.get()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn owner_id(&self) -> u64 {
        self.owner_id.get()
    }

    fn scope(&self) -> Scope {
        let bot_id = self.ctx.bot_id();
        let snapshot = self
            .ctx
            .cache
            .guild(self.id)
            .and_then(|guild| {
                guild
                    .members
                    .get(&bot_id)
                    .map(|member| guild.member_permissions(member).bits())
            })
            .map(CapabilitySnapshot::from_bits)
            .unwrap_or_default();
        Scope::guild(self.name.clone(), snapshot)
    }

    fn channels(&self) -> Vec<DiscordChannel> {
        let Some(guild) = self.ctx.cache.guild(self.id) else {
            return Vec::new();
        };
        let mut channels: Vec<_> = guild
            .channels
            .values()
            .filter(|c| c.kind == ChannelType::Text)
            .map(|c| (c.position, c.id, c.name.clone()))
            .collect();
        channels.sort_by_key(|(position, id, _)| (*position, *id));
        channels
            .into_iter()
            .map(|(_, id, name)| DiscordChannel::new(self.ctx.clone(), id, name, Some(self.id)))
            .collect()
    }

    async fn invites(&self) -> PlatformResult<Vec<String>> {
        self.id
            .invites(&self.ctx.http)
            .await
            .map(|invites| invites.iter().map(|i| i.url()).collect())
            .map_err(|e| classify(e, "list invites"))
    }

    async fn fetch_invite(&self, code: &str) -> PlatformResult<()> {
        self.ctx
            .http
            .get_invite(code, false, false, None)
            .await
            .map(|_| ())
            .map_err(|e| classify(e, "fetch invite"))
    }

    async fn ban(&self, user_id: u64, reason: &str, delete_message_days: u8) -> PlatformResult<()> {
        self.id
            .ban_with_reason(&self.ctx.http, UserId::new(user_id), delete_message_days, reason)
            .await
            .map_err(|e| classify(e, "ban member"))
    }

    async fn direct_message(&self, user_id: u64, text: &str) -> PlatformResult<()> {
        UserId::new(user_id)
            .direct_message(&self.ctx, CreateMessage::new().content(text))
            .await
            .map(|_| ())
            .map_err(|e| classify(e, "direct message"))
    }

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        category: Option<u64>,
    ) -> PlatformResult<DiscordChannel> {
        let kind = match kind {
            ChannelKind::Text => ChannelType::Text,
            ChannelKind::Voice => ChannelType::Voice,
            ChannelKind::Forum => ChannelType::Forum,
            ChannelKind::Stage => ChannelType::Stage,
        };
        let mut builder = CreateChannel::new(name).kind(kind);
        if let Some(category) = category {
            builder = builder.category(ChannelId::new(category));
        }
        let channel = self
            .id
            .create_channel(&self.ctx, builder)
            .await
            .map_err(|e| classify(e, "create channel"))?;
        Ok(DiscordChannel::new(
            self.ctx.clone(),
            channel.id,
            channel.name,
            Some(self.id),
        ))
    }
}

// ----------------------------------------------------------------------------
// Interactions
// ----------------------------------------------------------------------------

pub struct DiscordInteraction {
    ctx: DiscordContext,
    command: CommandInteraction,
    user: UserRef,
    channel: Option<DiscordChannel>,
    guild: Option<DiscordGuild>,
}

impl DiscordInteraction {
    /// Wrap a slash command, resolving its channel and guild.
    pub async fn from_command(ctx: DiscordContext, command: CommandInteraction) -> PlatformResult<Self> {
        let user = UserRef::new(command.user.id.get(), command.user.name.clone());
        let guild = match command.guild_id {
            Some(guild_id) => Some(DiscordGuild::fetch(ctx.clone(), guild_id).await?),
            None => None,
        };
        let channel_name = command
            .channel
            .as_ref()
            .and_then(|c| c.name.clone())
            .unwrap_or_else(|| command.channel_id.to_string());
        let channel = Some(DiscordChannel::new(
            ctx.clone(),
            command.channel_id,
            channel_name,
            command.guild_id,
        ));
        Ok(Self {
            ctx,
            command,
            user,
            channel,
            guild,
        })
    }
}

#[async_trait]
impl Interaction for DiscordInteraction {
    type Channel = DiscordChannel;
    type Guild = DiscordGuild;

    fn user(&self) -> &UserRef {
        &self.user
    }

    fn bot_id(&self) -> u64 {
        self.ctx.bot_id().get()
    }

    fn channel(&self) -> Option<&DiscordChannel> {
        self.channel.as_ref()
    }

    fn guild(&self) -> Option<&DiscordGuild> {
        self.guild.as_ref()
    }

    async fn respond(&self, content: &str, ephemeral: bool) -> PlatformResult<()> {
        let message = CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(ephemeral);
        self.command
            .create_response(&self.ctx, CreateInteractionResponse::Message(message))
            .await
            .map_err(|e| classify(e, "respond"))
    }

    async fn followup(&self, content: &str, ephemeral: bool) -> PlatformResult<DiscordMessage> {
        let followup = CreateInteractionResponseFollowup::new()
            .content(content)
            .ephemeral(ephemeral);
        self.command
            .create_followup(&self.ctx, followup)
            .await
            .map(|m| DiscordMessage::new(self.ctx.clone(), m))
            .map_err(|e| classify(e, "followup"))
    }
}
