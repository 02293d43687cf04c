//! Logging bootstrap for applications embedding guildkit.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "guildkit=info,serenity=warn";

/// Install a `fmt` subscriber filtered by `RUST_LOG`, or `default_filter`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(default_filter: Option<&str>) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.unwrap_or(DEFAULT_FILTER)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
