//! Narrow interfaces onto the chat-platform client.
//!
//! Every helper in this crate talks to the platform only through these
//! traits. The `discord` feature implements them over serenity; tests use
//! an in-memory fake.
//!
//! ## Traits
//!
//! - `OwnerNotifier` - best-effort fallback recipient for permission warnings
//! - `Channel` - anything the bot posts into (text channels, threads, DMs)
//! - `PlatformMessage` - a message handle returned by a send or fetch
//! - `Guild` - guild-level operations (bans, invites, channel management)
//! - `Interaction` - a slash-command interaction awaiting a response

#[cfg(feature = "discord")]
pub mod discord;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::permissions::Scope;

/// Failures reported by the platform client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// Missing permissions or role hierarchy prevents the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The interaction already received its initial response.
    #[error("interaction already acknowledged")]
    AlreadyAcknowledged,

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

impl PlatformError {
    #[inline]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// A file uploaded alongside a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Minimal user reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserRef {
    pub id: u64,
    pub name: String,
}

impl UserRef {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Kind of guild channel to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ChannelKind {
    #[default]
    Text,
    Voice,
    Forum,
    Stage,
}

impl ChannelKind {
    /// Parse a channel kind, falling back to `Text` for anything unrecognized.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "voice" => Self::Voice,
            "forum" => Self::Forum,
            "stage" | "stage_voice" => Self::Stage,
            _ => Self::Text,
        }
    }
}

impl From<String> for ChannelKind {
    fn from(input: String) -> Self {
        Self::parse(&input)
    }
}

/// Receives plain-text notices when the bot degrades gracefully.
#[async_trait]
pub trait OwnerNotifier: Send + Sync {
    /// Deliver `text` to the owner of the guild this target belongs to.
    async fn notify_owner(&self, text: &str) -> PlatformResult<()>;
}

/// A message handle.
#[async_trait]
pub trait PlatformMessage: Send + Sync {
    fn id(&self) -> u64;
    fn author_id(&self) -> u64;
    fn content(&self) -> &str;
    fn jump_url(&self) -> String;

    async fn delete(&self) -> PlatformResult<()>;
}

/// A message target: guild text channel, thread or direct-message channel.
#[async_trait]
pub trait Channel: OwnerNotifier {
    type Message: PlatformMessage;

    fn id(&self) -> u64;
    fn name(&self) -> String;

    /// The bot's capabilities in this channel, resolved at call time.
    fn scope(&self) -> Scope;

    async fn send(&self, content: &str, attachments: &[Attachment]) -> PlatformResult<Self::Message>;

    async fn fetch_message(&self, id: u64) -> PlatformResult<Self::Message>;

    /// Wait for the next message by `author_id` in this channel.
    ///
    /// Returns `Ok(None)` when `timeout` elapses first.
    async fn wait_for_reply(
        &self,
        author_id: u64,
        timeout: Duration,
    ) -> PlatformResult<Option<Self::Message>>;

    /// Create an invite and return its URL.
    async fn create_invite(&self, max_age: Duration, reason: &str) -> PlatformResult<String>;

    async fn delete(&self, reason: &str) -> PlatformResult<()>;
}

/// Guild-level operations.
#[async_trait]
pub trait Guild: Send + Sync {
    type Channel: Channel;

    fn id(&self) -> u64;
    fn name(&self) -> String;
    fn owner_id(&self) -> u64;

    /// The bot's guild-wide capabilities, resolved at call time.
    fn scope(&self) -> Scope;

    fn channels(&self) -> Vec<Self::Channel>;

    /// URLs of the guild's existing invites.
    async fn invites(&self) -> PlatformResult<Vec<String>>;

    /// Resolve an invite code, failing with `NotFound` once it has expired.
    async fn fetch_invite(&self, code: &str) -> PlatformResult<()>;

    async fn ban(&self, user_id: u64, reason: &str, delete_message_days: u8) -> PlatformResult<()>;

    async fn direct_message(&self, user_id: u64, text: &str) -> PlatformResult<()>;

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        category: Option<u64>,
    ) -> PlatformResult<Self::Channel>;
}

/// A command interaction.
#[async_trait]
pub trait Interaction: Send + Sync {
    type Channel: Channel;
    type Guild: Guild<Channel = Self::Channel>;

    /// The user who triggered the interaction.
    fn user(&self) -> &UserRef;
    fn bot_id(&self) -> u64;
    fn channel(&self) -> Option<&Self::Channel>;
    fn guild(&self) -> Option<&Self::Guild>;

    /// Initial response. Fails with `AlreadyAcknowledged` if one was sent.
    async fn respond(&self, content: &str, ephemeral: bool) -> PlatformResult<()>;

    async fn followup(
        &self,
        content: &str,
        ephemeral: bool,
    ) -> PlatformResult<<Self::Channel as Channel>::Message>;
}
