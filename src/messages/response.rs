//! Interaction responses with fallbacks.

use tracing::debug;

use super::dispatch;
use crate::degradation::DegradationMode;
use crate::error::{Error, Result};
use crate::permissions::{self, SEND_PERMISSIONS};
use crate::platform::{Channel, Interaction, PlatformError};

/// Respond to `interaction`, falling back to a followup and then to a plain
/// channel message.
///
/// An initial response carries no message handle, so success there yields
/// `Ok(None)`.
pub async fn send_response<I>(
    interaction: &I,
    content: &str,
    ephemeral: bool,
    mode: impl Into<DegradationMode>,
) -> Result<Option<<I::Channel as Channel>::Message>>
where
    I: Interaction,
{
    let mode = mode.into();
    let content = if content.is_empty() { " " } else { content };

    match interaction.respond(content, ephemeral).await {
        Ok(()) => Ok(None),
        Err(PlatformError::Forbidden(reason)) => {
            debug!(%reason, "Interaction response denied");
            degrade_denied(interaction, mode).await
        }
        Err(PlatformError::NotFound(_) | PlatformError::AlreadyAcknowledged) => {
            match interaction.followup(content, ephemeral).await {
                Ok(message) => Ok(Some(message)),
                Err(PlatformError::NotFound(_)) => {
                    dispatch::send_message(interaction.channel(), Some(content), mode).await
                }
                Err(PlatformError::Forbidden(reason)) => {
                    debug!(%reason, "Interaction followup denied");
                    degrade_denied(interaction, mode).await
                }
                Err(e) => Err(e.into()),
            }
        }
        Err(e) => {
            debug!(error = %e, "Interaction response failed, sending to channel");
            dispatch::send_message(interaction.channel(), Some(content), mode).await
        }
    }
}

async fn degrade_denied<I>(
    interaction: &I,
    mode: DegradationMode,
) -> Result<Option<<I::Channel as Channel>::Message>>
where
    I: Interaction,
{
    let channel = interaction.channel().ok_or(Error::NoChannel)?;
    let missing = permissions::missing(&channel.scope(), SEND_PERMISSIONS);
    dispatch::degrade(channel, &missing, mode).await?;
    Ok(None)
}
