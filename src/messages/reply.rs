//! Prompting for replies, fetching and deleting messages.

use std::time::Duration;

use tracing::{debug, error};

use super::dispatch::send_message;
use crate::degradation::DegradationMode;
use crate::error::{Error, Result};
use crate::platform::{Channel, PlatformError, PlatformMessage};

/// How long to wait for a user's follow-up message.
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(600);

/// Result of waiting for a user's reply.
#[derive(Debug)]
pub enum ReplyOutcome<M> {
    Message(M),
    /// The user answered `cancel`.
    Cancelled,
    TimedOut,
}

/// Post `prompt` and wait for `author_id` to answer in `channel`.
///
/// The prompt is deleted afterwards on a best-effort basis.
pub async fn await_message<C>(
    channel: &C,
    author_id: u64,
    prompt: &str,
    timeout: Duration,
) -> Result<ReplyOutcome<C::Message>>
where
    C: Channel,
{
    let prompt = send_message(Some(channel), Some(prompt), DegradationMode::Error).await?;

    let reply = channel.wait_for_reply(author_id, timeout).await;

    if let Some(prompt) = prompt {
        if let Err(e) = prompt.delete().await {
            debug!(channel = %channel.name(), error = %e, "Could not delete prompt");
        }
    }

    Ok(match reply? {
        Some(message) if message.content().to_lowercase() == "cancel" => {
            ReplyOutcome::Cancelled
        }
        Some(message) => ReplyOutcome::Message(message),
        None => ReplyOutcome::TimedOut,
    })
}

/// [`await_message`] with the reply timeout treated as an error.
///
/// Returns `Ok(None)` when the user cancelled.
pub async fn await_message_or_cancel<C>(
    channel: &C,
    author_id: u64,
    prompt: &str,
) -> Result<Option<C::Message>>
where
    C: Channel,
{
    match await_message(channel, author_id, prompt, REPLY_TIMEOUT).await? {
        ReplyOutcome::Message(message) => Ok(Some(message)),
        ReplyOutcome::Cancelled => Ok(None),
        ReplyOutcome::TimedOut => Err(Error::TimedOut(format!(
            "no reply from {author_id} in {} after {}s",
            channel.name(),
            REPLY_TIMEOUT.as_secs()
        ))),
    }
}

/// Fetch message `id` after waiting `wait`, or `None` if it does not exist.
///
/// The delay helps with thread starter messages, which often appear late.
pub async fn fetch_message_or_none<C>(channel: &C, id: u64, wait: Duration) -> Result<Option<C::Message>>
where
    C: Channel,
{
    if !wait.is_zero() {
        tokio::time::sleep(wait).await;
    }

    match channel.fetch_message(id).await {
        Ok(message) => Ok(Some(message)),
        Err(PlatformError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Delete `message`, telling the channel if the bot is not allowed to.
///
/// Never fails: other errors are logged.
pub async fn delete_message<C>(channel: &C, message: &C::Message)
where
    C: Channel,
{
    match message.delete().await {
        Ok(()) => {}
        Err(PlatformError::Forbidden(_)) => {
            let notice = format!("Could not delete message {}", message.jump_url());
            if let Err(e) = send_message(Some(channel), Some(&notice), DegradationMode::Ignore).await {
                debug!(channel = %channel.name(), error = %e, "Could not report failed delete");
            }
        }
        Err(e) => {
            error!(message_id = message.id(), error = %e, "Failed to delete message");
        }
    }
}
