//! Configuration for guildkit helpers.
//!
//! Loads configuration from environment variables (and `.env`, if present).

use std::env;
use std::time::Duration;

use crate::actions::DEFAULT_INVITE_MAX_AGE;
use crate::degradation::DegradationMode;
use crate::error::{Error, Result};
use crate::messages::REPLY_TIMEOUT;
use crate::permissions;

/// Helper configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How permission gaps are surfaced when a send is denied.
    pub error_mode: DegradationMode,

    /// How long to wait for a user's follow-up message.
    pub reply_timeout: Duration,

    /// Lifetime of invites created by the bot.
    pub invite_max_age: Duration,

    /// Permissions the bot expects to hold (comma-separated).
    /// Validated against the permission vocabulary.
    pub required_permissions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            error_mode: DegradationMode::Error,
            reply_timeout: REPLY_TIMEOUT,
            invite_max_age: DEFAULT_INVITE_MAX_AGE,
            required_permissions: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let error_mode = lookup("GUILDKIT_ERROR_MODE")
            .map(|mode| DegradationMode::parse(&mode))
            .unwrap_or(defaults.error_mode);

        let reply_timeout = parse_secs(&lookup, "GUILDKIT_REPLY_TIMEOUT_SECS")?
            .unwrap_or(defaults.reply_timeout);

        let invite_max_age = parse_secs(&lookup, "GUILDKIT_INVITE_MAX_AGE_SECS")?
            .unwrap_or(defaults.invite_max_age);

        let required_permissions = match lookup("GUILDKIT_REQUIRED_PERMISSIONS") {
            Some(raw) => permissions::validate(raw.split(','))?,
            None => defaults.required_permissions,
        };

        Ok(Self {
            error_mode,
            reply_timeout,
            invite_max_age,
            required_permissions,
        })
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|_| Error::Config(format!("{key} must be a number of seconds, got {raw:?}")))
}
