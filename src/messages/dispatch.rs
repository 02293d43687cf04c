//! Message sending with chunking and permission degradation.

use tracing::{debug, warn};

use crate::degradation::{self, DegradationMode};
use crate::error::{Error, Result};
use crate::permissions::{self, SEND_PERMISSIONS};
use crate::platform::{Attachment, Channel, PlatformError};

/// Largest chunk sent in one message.
pub const MAX_LENGTH: usize = 1800;

const DENIED_CONTEXT: &str = "Missing permission to send message";

/// How a send attempt ended before degradation.
#[derive(Debug)]
pub enum SendOutcome<M> {
    Sent(M),
    /// The platform refused; carries the send permissions the bot lacks.
    Denied(Vec<String>),
    Failed(Error),
}

/// Split `content` into chunks of at most `max` characters.
///
/// Empty content becomes a single space, since the platform rejects empty
/// messages.
pub fn split_content(content: &str, max: usize) -> Vec<&str> {
    if content.is_empty() {
        return vec![" "];
    }

    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in content.char_indices() {
        if count == max {
            chunks.push(&content[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    chunks.push(&content[start..]);
    chunks
}

/// Send `content` to `channel`, returning the last chunk's message.
///
/// Returns `Ok(None)` when the platform denied the send and `mode` is
/// `Warn` or `Ignore`.
pub async fn send_message<C>(
    channel: Option<&C>,
    content: Option<&str>,
    mode: impl Into<DegradationMode>,
) -> Result<Option<C::Message>>
where
    C: Channel,
{
    send_message_with_files(channel, content, &[], mode).await
}

/// Like [`send_message`] but uploads `attachments` with the first chunk.
pub async fn send_message_with_files<C>(
    channel: Option<&C>,
    content: Option<&str>,
    attachments: &[Attachment],
    mode: impl Into<DegradationMode>,
) -> Result<Option<C::Message>>
where
    C: Channel,
{
    let channel = channel.ok_or(Error::NoChannel)?;
    let mode = mode.into();

    match attempt(channel, content.unwrap_or_default(), attachments).await {
        SendOutcome::Sent(message) => Ok(Some(message)),
        SendOutcome::Denied(missing) => {
            degrade(channel, &missing, mode).await?;
            Ok(None)
        }
        SendOutcome::Failed(err) => Err(err),
    }
}

/// Apply `mode` to a denied send in `channel`.
pub(crate) async fn degrade<C>(channel: &C, missing: &[String], mode: DegradationMode) -> Result<()>
where
    C: Channel,
{
    degradation::handle(missing, &channel.scope(), mode, DENIED_CONTEXT, channel).await
}

/// Send every chunk in order, stopping at the first failure.
pub async fn attempt<C>(channel: &C, content: &str, attachments: &[Attachment]) -> SendOutcome<C::Message>
where
    C: Channel,
{
    let chunks = split_content(content, MAX_LENGTH);
    let total = chunks.len();
    let mut last = None;

    for (i, chunk) in chunks.into_iter().enumerate() {
        let files = if i == 0 { attachments } else { &[] };
        match channel.send(chunk, files).await {
            Ok(message) => last = Some(message),
            Err(PlatformError::Forbidden(reason)) => {
                let missing = permissions::missing(&channel.scope(), SEND_PERMISSIONS);
                debug!(
                    channel = %channel.name(),
                    %reason,
                    missing = ?missing,
                    "Send denied"
                );
                return SendOutcome::Denied(missing);
            }
            Err(e) => {
                warn!(channel = %channel.name(), chunk = i + 1, total, error = %e, "Send failed");
                return SendOutcome::Failed(e.into());
            }
        }
    }

    match last {
        Some(message) => SendOutcome::Sent(message),
        None => SendOutcome::Failed(Error::Platform("no chunks were sent".to_string())),
    }
}
