//! Scopes and capability snapshots.

use std::collections::HashMap;
use std::fmt;

use super::vocabulary::{self, PERMISSIONS};

/// Point-in-time map of which permissions the bot holds.
///
/// Tokens absent from the map read as not held.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySnapshot {
    grants: HashMap<String, bool>,
}

impl CapabilitySnapshot {
    /// Snapshot with nothing granted.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from explicit token/value pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Self {
            grants: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Build a snapshot over the whole vocabulary from Discord permission bits.
    pub fn from_bits(bits: u64) -> Self {
        let grants = PERMISSIONS
            .iter()
            .map(|token| {
                let held = vocabulary::bit(token)
                    .map(|b| bits & (1u64 << b) != 0)
                    .unwrap_or(false);
                ((*token).to_string(), held)
            })
            .collect();
        Self { grants }
    }

    /// Whether `token` is held. Unknown tokens are never held.
    #[inline]
    pub fn holds(&self, token: &str) -> bool {
        vocabulary::is_known(token) && self.grants.get(token).copied().unwrap_or(false)
    }
}

/// The context a capability snapshot was taken in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Channel {
        name: String,
        capabilities: CapabilitySnapshot,
    },
    Guild {
        name: String,
        capabilities: CapabilitySnapshot,
    },
}

impl Scope {
    pub fn channel(name: impl Into<String>, capabilities: CapabilitySnapshot) -> Self {
        Self::Channel {
            name: name.into(),
            capabilities,
        }
    }

    pub fn guild(name: impl Into<String>, capabilities: CapabilitySnapshot) -> Self {
        Self::Guild {
            name: name.into(),
            capabilities,
        }
    }

    #[inline]
    pub fn capabilities(&self) -> &CapabilitySnapshot {
        match self {
            Self::Channel { capabilities, .. } | Self::Guild { capabilities, .. } => capabilities,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Self::Channel { name, .. } | Self::Guild { name, .. } => name,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel { name, .. } => write!(f, "channel {name}"),
            Self::Guild { name, .. } => write!(f, "guild {name}"),
        }
    }
}
