//! Canonical permission vocabulary.
//!
//! Token names follow the attribute names Discord libraries expose. Several
//! tokens are aliases for the same permission bit.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};

/// Every recognized permission token paired with its Discord permission bit.
const TABLE: &[(&str, u8)] = &[
    ("add_reactions", 6),
    ("administrator", 3),
    ("attach_files", 15),
    ("ban_members", 2),
    ("change_nickname", 26),
    ("connect", 20),
    ("create_events", 44),
    ("create_expressions", 43),
    ("create_instant_invite", 0),
    ("create_polls", 49),
    ("create_private_threads", 36),
    ("create_public_threads", 35),
    ("deafen_members", 23),
    ("embed_links", 14),
    ("external_emojis", 18),
    ("external_stickers", 37),
    ("kick_members", 1),
    ("manage_channels", 4),
    ("manage_emojis", 30),
    ("manage_emojis_and_stickers", 30),
    ("manage_events", 33),
    ("manage_expressions", 30),
    ("manage_guild", 5),
    ("manage_messages", 13),
    ("manage_nicknames", 27),
    ("manage_permissions", 28),
    ("manage_roles", 28),
    ("manage_threads", 34),
    ("manage_webhooks", 29),
    ("mention_everyone", 17),
    ("moderate_members", 40),
    ("move_members", 24),
    ("mute_members", 22),
    ("priority_speaker", 8),
    ("read_message_history", 16),
    ("read_messages", 10),
    ("request_to_speak", 32),
    ("send_messages", 11),
    ("send_messages_in_threads", 38),
    ("send_polls", 49),
    ("send_tts_messages", 12),
    ("send_voice_messages", 46),
    ("speak", 21),
    ("stream", 9),
    ("use_application_commands", 31),
    ("use_embedded_activities", 39),
    ("use_external_apps", 50),
    ("use_external_emojis", 18),
    ("use_external_sounds", 45),
    ("use_external_stickers", 37),
    ("use_soundboard", 42),
    ("use_voice_activation", 25),
    ("view_audit_log", 7),
    ("view_channel", 10),
    ("view_creator_monetization_analytics", 41),
    ("view_guild_insights", 19),
];

/// Canonical vocabulary, in canonical order.
pub static PERMISSIONS: Lazy<Vec<&'static str>> =
    Lazy::new(|| TABLE.iter().map(|(name, _)| *name).collect());

static BITS: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| TABLE.iter().copied().collect());

/// Permissions needed to post a message with embeds and files.
pub const SEND_PERMISSIONS: [&str; 4] = ["view_channel", "send_messages", "embed_links", "attach_files"];

/// Whether `token` belongs to the canonical vocabulary.
#[inline]
pub fn is_known(token: &str) -> bool {
    BITS.contains_key(token)
}

/// Discord permission bit for `token`.
#[inline]
pub fn bit(token: &str) -> Option<u8> {
    BITS.get(token).copied()
}

/// Validate tokens accepted from configuration.
///
/// Tokens are trimmed and lowercased; empty entries are skipped.
pub fn validate<I, S>(tokens: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut valid = Vec::new();
    for token in tokens {
        let token = token.as_ref().trim().to_lowercase();
        if token.is_empty() {
            continue;
        }
        if !is_known(&token) {
            return Err(Error::UnknownPermission(token));
        }
        valid.push(token);
    }
    Ok(valid)
}
