//! Error types for guildkit.
//!
//! Collaborators report failures as [`PlatformError`]; helpers surface
//! [`Error`] to the command layer.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors surfaced by guildkit helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// The platform refused the operation for lack of permissions.
    #[error("platform denied the request: {0}")]
    CapabilityDenied(String),

    /// The bot is missing permissions in a scope.
    #[error("{}", format_missing(.context, .scope, .missing))]
    NoPermission {
        context: String,
        scope: String,
        missing: Vec<String>,
    },

    #[error("No channel set or does not exist, check the config or fill in the required arguments.")]
    NoChannel,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("timed out: {0}")]
    TimedOut(String),

    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("ban ledger error: {0}")]
    BanLog(#[source] anyhow::Error),

    #[error("platform error: {0}")]
    Platform(String),
}

fn format_missing(context: &str, scope: &str, missing: &[String]) -> String {
    format!("{context} in {scope}: {}", missing.join(", "))
}

impl Error {
    /// Static label for log fields.
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::CapabilityDenied(_) => "capability_denied",
            Self::NoPermission { .. } => "no_permission",
            Self::NoChannel => "no_channel",
            Self::NotFound(_) => "not_found",
            Self::TimedOut(_) => "timed_out",
            Self::UnknownPermission(_) => "unknown_permission",
            Self::Config(_) => "config",
            Self::BanLog(_) => "ban_log",
            Self::Platform(_) => "platform",
        }
    }

    /// Missing permissions carried by a `NoPermission` error.
    pub fn missing_permissions(&self) -> Option<&[String]> {
        match self {
            Self::NoPermission { missing, .. } => Some(missing),
            _ => None,
        }
    }
}

impl From<PlatformError> for Error {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::Forbidden(what) => Self::CapabilityDenied(what),
            PlatformError::NotFound(what) => Self::NotFound(what),
            PlatformError::Timeout(what) => Self::TimedOut(what),
            other @ (PlatformError::AlreadyAcknowledged | PlatformError::Other(_)) => {
                Self::Platform(other.to_string())
            }
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
