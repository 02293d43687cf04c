//! What to do when the bot lacks permissions.
//!
//! [`decide`] maps a missing-permission result to a [`Degradation`] without
//! side effects; [`handle`] carries it out.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Error;
use crate::permissions::Scope;
use crate::platform::OwnerNotifier;

/// How a permission gap is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DegradationMode {
    /// Raise `Error::NoPermission`.
    #[default]
    Error,
    /// Log a warning and tell the guild owner.
    Warn,
    /// Log at debug level only.
    Ignore,
}

impl DegradationMode {
    /// Parse a configured mode. Case and surrounding whitespace are ignored;
    /// anything unrecognized falls back to `Error`.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "ignore" => Self::Ignore,
            other => {
                debug!(mode = other, "Missing valid error_mode, defaulting to error");
                Self::Error
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Ignore => "ignore",
        }
    }
}

impl From<&str> for DegradationMode {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

impl From<String> for DegradationMode {
    fn from(input: String) -> Self {
        Self::parse(&input)
    }
}

impl fmt::Display for DegradationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The side effect chosen for a permission gap.
#[derive(Debug)]
pub enum Degradation {
    Raise(Error),
    Warn { scope: String, notice: String },
    Ignore { scope: String },
}

/// Choose the side effect for `missing` under `mode`.
///
/// Raising depends only on the mode, never on whether `missing` is empty.
pub fn decide(missing: &[String], scope: &Scope, mode: DegradationMode, context: &str) -> Degradation {
    match mode {
        DegradationMode::Error => Degradation::Raise(Error::NoPermission {
            context: context.to_string(),
            scope: scope.to_string(),
            missing: missing.to_vec(),
        }),
        DegradationMode::Warn => Degradation::Warn {
            scope: scope.to_string(),
            notice: format!(
                "{context} in {}. Check permissions: {}",
                scope.name(),
                missing.join(", ")
            ),
        },
        DegradationMode::Ignore => Degradation::Ignore {
            scope: scope.to_string(),
        },
    }
}

/// Apply `mode` to a permission gap.
///
/// `Error` returns `Err(NoPermission)`. `Warn` logs and notifies the owner
/// through `notifier`, swallowing delivery failures. `Ignore` only logs.
pub async fn handle<N>(
    missing: &[String],
    scope: &Scope,
    mode: DegradationMode,
    context: &str,
    notifier: &N,
) -> crate::Result<()>
where
    N: OwnerNotifier + ?Sized,
{
    match decide(missing, scope, mode, context) {
        Degradation::Raise(err) => Err(err),
        Degradation::Warn { scope, notice } => {
            warn!(%scope, missing = ?missing, "{context}");
            if let Err(e) = notifier.notify_owner(&notice).await {
                debug!(%scope, error = %e, "Could not notify guild owner");
            }
            Ok(())
        }
        Degradation::Ignore { scope } => {
            debug!(%scope, missing = ?missing, "{context}. Ignoring.");
            Ok(())
        }
    }
}
