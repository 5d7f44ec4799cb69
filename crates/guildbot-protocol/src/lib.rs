//! Gateway protocol definitions shared by the guildbot SDK.
//!
//! Frames arriving over the gateway WebSocket look like
//! `{"op": 0, "s": 42, "t": "MESSAGE_CREATE", "d": {...}}`. This crate models
//! the envelope, the opcodes, the event-type tags and the intent flags a
//! client advertises to receive them.

pub mod event_data;

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnNull};

pub use event_data::*;

// ============================================================================
// OpCode
// ============================================================================

/// Gateway operation code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum OpCode {
    /// Server pushes a business event
    #[default]
    Dispatch,
    Heartbeat,
    Identity,
    Resume,
    /// Server asks the client to reconnect
    Reconnect,
    InvalidSession,
    /// First frame after connecting, carries the heartbeat interval
    Hello,
    HeartbeatAck,
    HttpCallbackAck,
    Unknown(u32),
}

impl OpCode {
    pub fn as_u32(&self) -> u32 {
        match self {
            OpCode::Dispatch => 0,
            OpCode::Heartbeat => 1,
            OpCode::Identity => 2,
            OpCode::Resume => 6,
            OpCode::Reconnect => 7,
            OpCode::InvalidSession => 9,
            OpCode::Hello => 10,
            OpCode::HeartbeatAck => 11,
            OpCode::HttpCallbackAck => 12,
            OpCode::Unknown(code) => *code,
        }
    }

    pub fn is_dispatch(&self) -> bool {
        matches!(self, OpCode::Dispatch)
    }
}

impl From<u32> for OpCode {
    fn from(code: u32) -> Self {
        match code {
            0 => OpCode::Dispatch,
            1 => OpCode::Heartbeat,
            2 => OpCode::Identity,
            6 => OpCode::Resume,
            7 => OpCode::Reconnect,
            9 => OpCode::InvalidSession,
            10 => OpCode::Hello,
            11 => OpCode::HeartbeatAck,
            12 => OpCode::HttpCallbackAck,
            other => OpCode::Unknown(other),
        }
    }
}

impl From<OpCode> for u32 {
    fn from(op: OpCode) -> Self {
        op.as_u32()
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

// ============================================================================
// Intent
// ============================================================================

/// Bit set of event groups a client subscribes to when identifying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intent(u32);

impl Intent {
    pub const NONE: Intent = Intent(0);
    /// Guild and channel lifecycle
    pub const GUILDS: Intent = Intent(1 << 0);
    pub const GUILD_MEMBERS: Intent = Intent(1 << 1);
    /// Every message in a guild, private bots only
    pub const GUILD_MESSAGES: Intent = Intent(1 << 9);
    pub const GUILD_MESSAGE_REACTIONS: Intent = Intent(1 << 10);
    pub const DIRECT_MESSAGE: Intent = Intent(1 << 12);
    pub const OPEN_FORUMS_EVENT: Intent = Intent(1 << 18);
    pub const AUDIO_OR_LIVE_CHANNEL_MEMBER: Intent = Intent(1 << 19);
    pub const INTERACTION: Intent = Intent(1 << 26);
    pub const MESSAGE_AUDIT: Intent = Intent(1 << 27);
    pub const FORUMS: Intent = Intent(1 << 28);
    pub const AUDIO_ACTION: Intent = Intent(1 << 29);
    /// Messages that mention the bot
    pub const PUBLIC_GUILD_MESSAGES: Intent = Intent(1 << 30);

    pub const fn from_bits(bits: u32) -> Self {
        Intent(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Whether every flag of `other` is set
    pub const fn contains(&self, other: Intent) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Intent {
    type Output = Intent;

    fn bitor(self, rhs: Intent) -> Intent {
        Intent(self.0 | rhs.0)
    }
}

impl BitOrAssign for Intent {
    fn bitor_assign(&mut self, rhs: Intent) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<Intent> for Intent {
    fn from_iter<I: IntoIterator<Item = Intent>>(iter: I) -> Self {
        iter.into_iter().fold(Intent::NONE, |acc, i| acc | i)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// ============================================================================
// Event Type
// ============================================================================

/// Event type tag carried in the `t` field of dispatch frames
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    // Session
    Ready,
    Resumed,

    // Guild relations
    GuildCreate,
    GuildUpdate,
    GuildDelete,
    ChannelCreate,
    ChannelUpdate,
    ChannelDelete,
    GuildMemberAdd,
    GuildMemberUpdate,
    GuildMemberRemove,

    // Messages
    MessageCreate,
    MessageDelete,
    MessageReactionAdd,
    MessageReactionRemove,
    AtMessageCreate,
    PublicMessageDelete,
    DirectMessageCreate,
    DirectMessageDelete,
    MessageAuditPass,
    MessageAuditReject,

    // Audio
    AudioStart,
    AudioFinish,
    AudioOnMic,
    AudioOffMic,

    // Forum
    ForumThreadCreate,
    ForumThreadUpdate,
    ForumThreadDelete,
    ForumPostCreate,
    ForumPostDelete,
    ForumReplyCreate,
    ForumReplyDelete,
    ForumAuditResult,

    // Interaction
    InteractionCreate,

    /// A tag this SDK does not know about
    Unknown(String),
}

impl EventType {
    /// Every tag this SDK understands
    pub const KNOWN: [EventType; 34] = [
        EventType::Ready,
        EventType::Resumed,
        EventType::GuildCreate,
        EventType::GuildUpdate,
        EventType::GuildDelete,
        EventType::ChannelCreate,
        EventType::ChannelUpdate,
        EventType::ChannelDelete,
        EventType::GuildMemberAdd,
        EventType::GuildMemberUpdate,
        EventType::GuildMemberRemove,
        EventType::MessageCreate,
        EventType::MessageDelete,
        EventType::MessageReactionAdd,
        EventType::MessageReactionRemove,
        EventType::AtMessageCreate,
        EventType::PublicMessageDelete,
        EventType::DirectMessageCreate,
        EventType::DirectMessageDelete,
        EventType::MessageAuditPass,
        EventType::MessageAuditReject,
        EventType::AudioStart,
        EventType::AudioFinish,
        EventType::AudioOnMic,
        EventType::AudioOffMic,
        EventType::ForumThreadCreate,
        EventType::ForumThreadUpdate,
        EventType::ForumThreadDelete,
        EventType::ForumPostCreate,
        EventType::ForumPostDelete,
        EventType::ForumReplyCreate,
        EventType::ForumReplyDelete,
        EventType::ForumAuditResult,
        EventType::InteractionCreate,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Ready => "READY",
            EventType::Resumed => "RESUMED",
            EventType::GuildCreate => "GUILD_CREATE",
            EventType::GuildUpdate => "GUILD_UPDATE",
            EventType::GuildDelete => "GUILD_DELETE",
            EventType::ChannelCreate => "CHANNEL_CREATE",
            EventType::ChannelUpdate => "CHANNEL_UPDATE",
            EventType::ChannelDelete => "CHANNEL_DELETE",
            EventType::GuildMemberAdd => "GUILD_MEMBER_ADD",
            EventType::GuildMemberUpdate => "GUILD_MEMBER_UPDATE",
            EventType::GuildMemberRemove => "GUILD_MEMBER_REMOVE",
            EventType::MessageCreate => "MESSAGE_CREATE",
            EventType::MessageDelete => "MESSAGE_DELETE",
            EventType::MessageReactionAdd => "MESSAGE_REACTION_ADD",
            EventType::MessageReactionRemove => "MESSAGE_REACTION_REMOVE",
            EventType::AtMessageCreate => "AT_MESSAGE_CREATE",
            EventType::PublicMessageDelete => "PUBLIC_MESSAGE_DELETE",
            EventType::DirectMessageCreate => "DIRECT_MESSAGE_CREATE",
            EventType::DirectMessageDelete => "DIRECT_MESSAGE_DELETE",
            EventType::MessageAuditPass => "MESSAGE_AUDIT_PASS",
            EventType::MessageAuditReject => "MESSAGE_AUDIT_REJECT",
            EventType::AudioStart => "AUDIO_START",
            EventType::AudioFinish => "AUDIO_FINISH",
            EventType::AudioOnMic => "AUDIO_ON_MIC",
            EventType::AudioOffMic => "AUDIO_OFF_MIC",
            EventType::ForumThreadCreate => "FORUM_THREAD_CREATE",
            EventType::ForumThreadUpdate => "FORUM_THREAD_UPDATE",
            EventType::ForumThreadDelete => "FORUM_THREAD_DELETE",
            EventType::ForumPostCreate => "FORUM_POST_CREATE",
            EventType::ForumPostDelete => "FORUM_POST_DELETE",
            EventType::ForumReplyCreate => "FORUM_REPLY_CREATE",
            EventType::ForumReplyDelete => "FORUM_REPLY_DELETE",
            EventType::ForumAuditResult => "FORUM_PUBLISH_AUDIT_RESULT",
            EventType::InteractionCreate => "INTERACTION_CREATE",
            EventType::Unknown(tag) => tag,
        }
    }

    pub fn parse(tag: &str) -> Self {
        match tag {
            "READY" => EventType::Ready,
            "RESUMED" => EventType::Resumed,
            "GUILD_CREATE" => EventType::GuildCreate,
            "GUILD_UPDATE" => EventType::GuildUpdate,
            "GUILD_DELETE" => EventType::GuildDelete,
            "CHANNEL_CREATE" => EventType::ChannelCreate,
            "CHANNEL_UPDATE" => EventType::ChannelUpdate,
            "CHANNEL_DELETE" => EventType::ChannelDelete,
            "GUILD_MEMBER_ADD" => EventType::GuildMemberAdd,
            "GUILD_MEMBER_UPDATE" => EventType::GuildMemberUpdate,
            "GUILD_MEMBER_REMOVE" => EventType::GuildMemberRemove,
            "MESSAGE_CREATE" => EventType::MessageCreate,
            "MESSAGE_DELETE" => EventType::MessageDelete,
            "MESSAGE_REACTION_ADD" => EventType::MessageReactionAdd,
            "MESSAGE_REACTION_REMOVE" => EventType::MessageReactionRemove,
            "AT_MESSAGE_CREATE" => EventType::AtMessageCreate,
            "PUBLIC_MESSAGE_DELETE" => EventType::PublicMessageDelete,
            "DIRECT_MESSAGE_CREATE" => EventType::DirectMessageCreate,
            "DIRECT_MESSAGE_DELETE" => EventType::DirectMessageDelete,
            "MESSAGE_AUDIT_PASS" => EventType::MessageAuditPass,
            "MESSAGE_AUDIT_REJECT" => EventType::MessageAuditReject,
            "AUDIO_START" => EventType::AudioStart,
            "AUDIO_FINISH" => EventType::AudioFinish,
            "AUDIO_ON_MIC" => EventType::AudioOnMic,
            "AUDIO_OFF_MIC" => EventType::AudioOffMic,
            "FORUM_THREAD_CREATE" => EventType::ForumThreadCreate,
            "FORUM_THREAD_UPDATE" => EventType::ForumThreadUpdate,
            "FORUM_THREAD_DELETE" => EventType::ForumThreadDelete,
            "FORUM_POST_CREATE" => EventType::ForumPostCreate,
            "FORUM_POST_DELETE" => EventType::ForumPostDelete,
            "FORUM_REPLY_CREATE" => EventType::ForumReplyCreate,
            "FORUM_REPLY_DELETE" => EventType::ForumReplyDelete,
            "FORUM_PUBLISH_AUDIT_RESULT" => EventType::ForumAuditResult,
            "INTERACTION_CREATE" => EventType::InteractionCreate,
            other => EventType::Unknown(other.to_string()),
        }
    }

    /// Intent a client must advertise to receive this event
    pub fn intent(&self) -> Intent {
        match self {
            EventType::GuildCreate
            | EventType::GuildUpdate
            | EventType::GuildDelete
            | EventType::ChannelCreate
            | EventType::ChannelUpdate
            | EventType::ChannelDelete => Intent::GUILDS,
            EventType::GuildMemberAdd
            | EventType::GuildMemberUpdate
            | EventType::GuildMemberRemove => Intent::GUILD_MEMBERS,
            EventType::MessageCreate | EventType::MessageDelete => Intent::GUILD_MESSAGES,
            EventType::MessageReactionAdd | EventType::MessageReactionRemove => {
                Intent::GUILD_MESSAGE_REACTIONS
            }
            EventType::AtMessageCreate | EventType::PublicMessageDelete => {
                Intent::PUBLIC_GUILD_MESSAGES
            }
            EventType::DirectMessageCreate | EventType::DirectMessageDelete => {
                Intent::DIRECT_MESSAGE
            }
            EventType::AudioStart
            | EventType::AudioFinish
            | EventType::AudioOnMic
            | EventType::AudioOffMic => Intent::AUDIO_ACTION,
            EventType::MessageAuditPass | EventType::MessageAuditReject => Intent::MESSAGE_AUDIT,
            EventType::ForumThreadCreate
            | EventType::ForumThreadUpdate
            | EventType::ForumThreadDelete
            | EventType::ForumPostCreate
            | EventType::ForumPostDelete
            | EventType::ForumReplyCreate
            | EventType::ForumReplyDelete
            | EventType::ForumAuditResult => Intent::FORUMS,
            EventType::InteractionCreate => Intent::INTERACTION,
            EventType::Ready | EventType::Resumed | EventType::Unknown(_) => Intent::NONE,
        }
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        EventType::parse(&tag)
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        event_type.as_str().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OR of the intents required by each of `events`
pub fn event_to_intent(events: &[EventType]) -> Intent {
    events.iter().map(EventType::intent).collect()
}

// ============================================================================
// Payload
// ============================================================================

/// A single gateway frame
///
/// A `null` opcode or sequence number reads as zero.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WsPayload {
    #[serde(rename = "op")]
    #[serde_as(as = "DefaultOnNull")]
    pub op_code: OpCode,
    /// Sequence number of dispatch frames, zero otherwise
    #[serde(rename = "s", default, skip_serializing_if = "is_zero")]
    #[serde_as(as = "DefaultOnNull")]
    pub seq: u32,
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// The frame exactly as received
    #[serde(skip)]
    pub raw_message: Vec<u8>,
}

fn is_zero(seq: &u32) -> bool {
    *seq == 0
}

impl WsPayload {
    /// Parse a received frame, keeping its raw bytes for typed decoding later
    pub fn from_slice(raw: &[u8]) -> serde_json::Result<Self> {
        let mut payload: WsPayload = serde_json::from_slice(raw)?;
        payload.raw_message = raw.to_vec();
        Ok(payload)
    }

    /// The `t` tag, empty for control frames
    pub fn event_type_name(&self) -> &str {
        self.event_type.as_ref().map(EventType::as_str).unwrap_or("")
    }

    /// Build a dispatch frame, mainly useful for tests and replays
    pub fn dispatch(seq: u32, event_type: EventType, data: Value) -> Self {
        let mut payload = WsPayload {
            op_code: OpCode::Dispatch,
            seq,
            event_type: Some(event_type),
            data: Some(data),
            raw_message: Vec::new(),
        };
        payload.raw_message = serde_json::to_vec(&payload).unwrap_or_default();
        payload
    }
}

// ============================================================================
// Tests
// ============================================================================
