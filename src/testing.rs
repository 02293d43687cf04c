//! In-memory platform used by unit tests.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::actions::BanLedger;
use crate::permissions::{CapabilitySnapshot, Scope};
use crate::platform::{
    Attachment, Channel, ChannelKind, Guild, Interaction, OwnerNotifier, PlatformError,
    PlatformMessage, PlatformResult, UserRef,
};

// ----------------------------------------------------------------------------
// Log capture
// ----------------------------------------------------------------------------

#[derive(Clone)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuf {
    type Writer = SharedBuf;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Log lines captured for the current thread while alive.
pub struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
    _guard: DefaultGuard,
}

impl CapturedLogs {
    /// Number of captured lines containing `needle`.
    pub fn count(&self, needle: &str) -> usize {
        let buf = self.buf.lock();
        String::from_utf8_lossy(&buf)
            .lines()
            .filter(|line| line.contains(needle))
            .count()
    }
}

pub fn capture_logs() -> CapturedLogs {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt()
        .with_writer(SharedBuf(buf.clone()))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    CapturedLogs { buf, _guard: guard }
}

// ----------------------------------------------------------------------------
// Messages and channels
// ----------------------------------------------------------------------------

#[derive(Default)]
struct ChannelState {
    capabilities: CapabilitySnapshot,
    next_id: u64,
    sent: Vec<(String, usize)>,
    send_failures: VecDeque<PlatformError>,
    owner_notices: Vec<String>,
    fail_owner_notices: bool,
    stored: HashMap<u64, (u64, String)>,
    replies: VecDeque<(u64, String)>,
    reply_waits: Vec<Duration>,
    deleted_messages: Vec<u64>,
    delete_failure: Option<PlatformError>,
    invite: Option<PlatformResult<String>>,
    invite_requests: Vec<(Duration, String)>,
    delete_channel_failure: Option<PlatformError>,
    deleted_with: Option<String>,
}

pub struct FakeMessage {
    id: u64,
    author_id: u64,
    channel_id: u64,
    content: String,
    state: Arc<Mutex<ChannelState>>,
}

impl fmt::Debug for FakeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeMessage")
            .field("id", &self.id)
            .field("author_id", &self.author_id)
            .field("content", &self.content)
            .finish()
    }
}

#[async_trait]
impl PlatformMessage for FakeMessage {
    fn id(&self) -> u64 {
        self.id
    }

    fn author_id(&self) -> u64 {
        self.author_id
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn jump_url(&self) -> String {
        format!("https://discord.com/channels/1/{}/{}", self.channel_id, self.id)
    }

    async fn delete(&self) -> PlatformResult<()> {
        let mut state = self.state.lock();
        if let Some(err) = state.delete_failure.clone() {
            return Err(err);
        }
        state.deleted_messages.push(self.id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeChannel {
    id: u64,
    name: String,
    state: Arc<Mutex<ChannelState>>,
}

pub const BOT_ID: u64 = 900;

impl FakeChannel {
    pub fn new(id: u64, name: &str) -> Self {
        let state = ChannelState {
            next_id: 1000,
            ..Default::default()
        };
        Self {
            id,
            name: name.to_string(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with_capabilities(self, pairs: &[(&str, bool)]) -> Self {
        self.state.lock().capabilities = CapabilitySnapshot::from_pairs(pairs.iter().copied());
        self
    }

    pub fn fail_next_send(&self, err: PlatformError) {
        self.state.lock().send_failures.push_back(err);
    }

    pub fn fail_owner_notices(&self) {
        self.state.lock().fail_owner_notices = true;
    }

    pub fn fail_deletes(&self, err: PlatformError) {
        self.state.lock().delete_failure = Some(err);
    }

    pub fn fail_channel_delete(&self, err: PlatformError) {
        self.state.lock().delete_channel_failure = Some(err);
    }

    pub fn set_invite(&self, result: PlatformResult<String>) {
        self.state.lock().invite = Some(result);
    }

    pub fn store_message(&self, id: u64, author_id: u64, content: &str) {
        self.state.lock().stored.insert(id, (author_id, content.to_string()));
    }

    pub fn queue_reply(&self, author_id: u64, content: &str) {
        self.state.lock().replies.push_back((author_id, content.to_string()));
    }

    pub fn message(&self, id: u64, author_id: u64, content: &str) -> FakeMessage {
        FakeMessage {
            id,
            author_id,
            channel_id: self.id,
            content: content.to_string(),
            state: self.state.clone(),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.state.lock().sent.iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn sent_attachment_counts(&self) -> Vec<usize> {
        self.state.lock().sent.iter().map(|(_, n)| *n).collect()
    }

    pub fn owner_notices(&self) -> Vec<String> {
        self.state.lock().owner_notices.clone()
    }

    pub fn deleted_messages(&self) -> Vec<u64> {
        self.state.lock().deleted_messages.clone()
    }

    pub fn reply_waits(&self) -> Vec<Duration> {
        self.state.lock().reply_waits.clone()
    }

    pub fn invite_requests(&self) -> Vec<(Duration, String)> {
        self.state.lock().invite_requests.clone()
    }

    pub fn deleted_with(&self) -> Option<String> {
        self.state.lock().deleted_with.clone()
    }
}

#[async_trait]
impl OwnerNotifier for FakeChannel {
    async fn notify_owner(&self, text: &str) -> PlatformResult<()> {
        let mut state = self.state.lock();
        if state.fail_owner_notices {
            return Err(PlatformError::Forbidden("owner has DMs closed".into()));
        }
        state.owner_notices.push(text.to_string());
        Ok(())
    }
}

#[async_trait]
impl Channel for FakeChannel {
    type Message = FakeMessage;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn scope(&self) -> Scope {
        Scope::channel(self.name.clone(), self.state.lock().capabilities.clone())
    }

    async fn send(&self, content: &str, attachments: &[Attachment]) -> PlatformResult<FakeMessage> {
        let mut state = self.state.lock();
        if let Some(err) = state.send_failures.pop_front() {
            return Err(err);
        }
        state.next_id += 1;
        state.sent.push((content.to_string(), attachments.len()));
        let id = state.next_id;
        drop(state);
        Ok(self.message(id, BOT_ID, content))
    }

    async fn fetch_message(&self, id: u64) -> PlatformResult<FakeMessage> {
        let stored = self.state.lock().stored.get(&id).cloned();
        match stored {
            Some((author_id, content)) => Ok(self.message(id, author_id, &content)),
            None => Err(PlatformError::NotFound(format!("message {id}"))),
        }
    }

    async fn wait_for_reply(
        &self,
        author_id: u64,
        timeout: Duration,
    ) -> PlatformResult<Option<FakeMessage>> {
        let mut state = self.state.lock();
        state.reply_waits.push(timeout);
        let position = state.replies.iter().position(|(author, _)| *author == author_id);
        let reply = position.and_then(|i| state.replies.remove(i));
        state.next_id += 1;
        let id = state.next_id;
        drop(state);
        Ok(reply.map(|(author, content)| self.message(id, author, &content)))
    }

    async fn create_invite(&self, max_age: Duration, reason: &str) -> PlatformResult<String> {
        let mut state = self.state.lock();
        state.invite_requests.push((max_age, reason.to_string()));
        state
            .invite
            .clone()
            .unwrap_or_else(|| Ok(format!("https://discord.gg/chan{}", self.id)))
    }

    async fn delete(&self, reason: &str) -> PlatformResult<()> {
        let mut state = self.state.lock();
        if let Some(err) = state.delete_channel_failure.clone() {
            return Err(err);
        }
        state.deleted_with = Some(reason.to_string());
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Guilds
// ----------------------------------------------------------------------------

#[derive(Default)]
struct GuildState {
    capabilities: CapabilitySnapshot,
    bans: Vec<(u64, String, u8)>,
    ban_failure: Option<PlatformError>,
    direct_messages: Vec<(u64, String)>,
    dm_failure: Option<PlatformError>,
    invites: Option<PlatformResult<Vec<String>>>,
    live_invites: Vec<String>,
    created: Vec<(String, ChannelKind, Option<u64>)>,
}

#[derive(Clone)]
pub struct FakeGuild {
    id: u64,
    name: String,
    owner_id: u64,
    channels: Vec<FakeChannel>,
    state: Arc<Mutex<GuildState>>,
}

pub const OWNER_ID: u64 = 1;

impl FakeGuild {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            owner_id: OWNER_ID,
            channels: Vec::new(),
            state: Arc::new(Mutex::new(GuildState::default())),
        }
    }

    pub fn with_capabilities(self, pairs: &[(&str, bool)]) -> Self {
        self.state.lock().capabilities = CapabilitySnapshot::from_pairs(pairs.iter().copied());
        self
    }

    pub fn with_channel(mut self, channel: FakeChannel) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn fail_bans(&self, err: PlatformError) {
        self.state.lock().ban_failure = Some(err);
    }

    pub fn fail_direct_messages(&self, err: PlatformError) {
        self.state.lock().dm_failure = Some(err);
    }

    pub fn set_invites(&self, result: PlatformResult<Vec<String>>) {
        self.state.lock().invites = Some(result);
    }

    pub fn add_live_invite(&self, code: &str) {
        self.state.lock().live_invites.push(code.to_string());
    }

    pub fn bans(&self) -> Vec<(u64, String, u8)> {
        self.state.lock().bans.clone()
    }

    pub fn direct_messages(&self) -> Vec<(u64, String)> {
        self.state.lock().direct_messages.clone()
    }

    pub fn created_channels(&self) -> Vec<(String, ChannelKind, Option<u64>)> {
        self.state.lock().created.clone()
    }
}

#[async_trait]
impl Guild for FakeGuild {
    type Channel = FakeChannel;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn owner_id(&self) -> u64 {
        self.owner_id
    }

    fn scope(&self) -> Scope {
        Scope::guild(self.name.clone(), self.state.lock().capabilities.clone())
    }

    fn channels(&self) -> Vec<FakeChannel> {
        self.channels.clone()
    }

    async fn invites(&self) -> PlatformResult<Vec<String>> {
        self.state.lock().invites.clone().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_invite(&self, code: &str) -> PlatformResult<()> {
        if self.state.lock().live_invites.iter().any(|c| c == code) {
            Ok(())
        } else {
            Err(PlatformError::NotFound(format!("invite {code}")))
        }
    }

    async fn ban(&self, user_id: u64, reason: &str, delete_message_days: u8) -> PlatformResult<()> {
        let mut state = self.state.lock();
        if let Some(err) = state.ban_failure.clone() {
            return Err(err);
        }
        state.bans.push((user_id, reason.to_string(), delete_message_days));
        Ok(())
    }

    async fn direct_message(&self, user_id: u64, text: &str) -> PlatformResult<()> {
        let mut state = self.state.lock();
        if let Some(err) = state.dm_failure.clone() {
            return Err(err);
        }
        state.direct_messages.push((user_id, text.to_string()));
        Ok(())
    }

    async fn create_channel(
        &self,
        name: &str,
        kind: ChannelKind,
        category: Option<u64>,
    ) -> PlatformResult<FakeChannel> {
        let mut state = self.state.lock();
        state.created.push((name.to_string(), kind, category));
        let id = 5000 + state.created.len() as u64;
        Ok(FakeChannel::new(id, name))
    }
}

// ----------------------------------------------------------------------------
// Interactions
// ----------------------------------------------------------------------------

#[derive(Default)]
struct InteractionState {
    respond_failure: Option<PlatformError>,
    followup_failure: Option<PlatformError>,
    responses: Vec<(String, bool)>,
    followups: Vec<(String, bool)>,
}

pub struct FakeInteraction {
    user: UserRef,
    channel: Option<FakeChannel>,
    guild: Option<FakeGuild>,
    state: Mutex<InteractionState>,
}

impl FakeInteraction {
    pub fn new(user: UserRef, channel: Option<FakeChannel>, guild: Option<FakeGuild>) -> Self {
        Self {
            user,
            channel,
            guild,
            state: Mutex::new(InteractionState::default()),
        }
    }

    pub fn fail_respond(&self, err: PlatformError) {
        self.state.lock().respond_failure = Some(err);
    }

    pub fn fail_followup(&self, err: PlatformError) {
        self.state.lock().followup_failure = Some(err);
    }

    pub fn responses(&self) -> Vec<(String, bool)> {
        self.state.lock().responses.clone()
    }

    pub fn followups(&self) -> Vec<(String, bool)> {
        self.state.lock().followups.clone()
    }
}

#[async_trait]
impl Interaction for FakeInteraction {
    type Channel = FakeChannel;
    type Guild = FakeGuild;

    fn user(&self) -> &UserRef {
        &self.user
    }

    fn bot_id(&self) -> u64 {
        BOT_ID
    }

    fn channel(&self) -> Option<&FakeChannel> {
        self.channel.as_ref()
    }

    fn guild(&self) -> Option<&FakeGuild> {
        self.guild.as_ref()
    }

    async fn respond(&self, content: &str, ephemeral: bool) -> PlatformResult<()> {
        let mut state = self.state.lock();
        if let Some(err) = state.respond_failure.clone() {
            return Err(err);
        }
        state.responses.push((content.to_string(), ephemeral));
        Ok(())
    }

    async fn followup(&self, content: &str, ephemeral: bool) -> PlatformResult<FakeMessage> {
        {
            let mut state = self.state.lock();
            if let Some(err) = state.followup_failure.clone() {
                return Err(err);
            }
            state.followups.push((content.to_string(), ephemeral));
        }
        let channel = self
            .channel
            .as_ref()
            .ok_or_else(|| PlatformError::NotFound("interaction channel".into()))?;
        Ok(channel.message(7, BOT_ID, content))
    }
}

// ----------------------------------------------------------------------------
// Ban ledger
// ----------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeLedger {
    entries: Mutex<Vec<(u64, u64, String, String)>>,
    fail: bool,
}

impl FakeLedger {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn entries(&self) -> Vec<(u64, u64, String, String)> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl BanLedger for FakeLedger {
    async fn add_ban(
        &self,
        user_id: u64,
        guild_id: u64,
        reason: &str,
        moderator: &str,
    ) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("ledger offline");
        }
        self.entries
            .lock()
            .push((user_id, guild_id, reason.to_string(), moderator.to_string()));
        Ok(())
    }
}
