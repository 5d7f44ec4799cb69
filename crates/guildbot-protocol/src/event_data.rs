//! Typed data carried in the `d` field of dispatch frames.
//!
//! Gateway payloads omit fields freely and send `null` for unset ones, so
//! every structure decodes both to the field's default.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnNull};

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw).ok()
}

// ============================================================================
// Session
// ============================================================================

/// Data for the `READY` event sent after a successful identify
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadyData {
    #[serde_as(as = "DefaultOnNull")]
    pub version: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub session_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub user: ReadyUser,
    /// `[shard_id, shard_count]`
    #[serde_as(as = "DefaultOnNull")]
    pub shard: Vec<u32>,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadyUser {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub username: String,
    #[serde_as(as = "DefaultOnNull")]
    pub bot: bool,
}

// ============================================================================
// Guild Relations
// ============================================================================

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub username: String,
    #[serde_as(as = "DefaultOnNull")]
    pub avatar: String,
    #[serde_as(as = "DefaultOnNull")]
    pub bot: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub union_openid: String,
    #[serde_as(as = "DefaultOnNull")]
    pub union_user_account: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guild {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    pub icon: String,
    #[serde_as(as = "DefaultOnNull")]
    pub owner_id: String,
    /// Whether the bot is the owner of this guild
    #[serde_as(as = "DefaultOnNull")]
    pub owner: bool,
    #[serde_as(as = "DefaultOnNull")]
    pub member_count: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub max_members: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub description: String,
    #[serde_as(as = "DefaultOnNull")]
    pub joined_at: String,
    /// Operator of the change, only present on update/delete events
    #[serde_as(as = "DefaultOnNull")]
    pub op_user_id: String,
}

impl Guild {
    pub fn joined_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.joined_at)
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnNull")]
    pub channel_type: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub sub_type: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub position: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub parent_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub owner_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub private_type: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub speak_permission: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub application_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub op_user_id: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub joined_at: String,
    #[serde_as(as = "DefaultOnNull")]
    pub nick: String,
    pub user: Option<User>,
    #[serde_as(as = "DefaultOnNull")]
    pub roles: Vec<String>,
    #[serde_as(as = "DefaultOnNull")]
    pub op_user_id: String,
}

impl Member {
    pub fn joined_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.joined_at)
    }
}

// ============================================================================
// Messages
// ============================================================================

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageAttachment {
    #[serde_as(as = "DefaultOnNull")]
    pub url: String,
    #[serde_as(as = "DefaultOnNull")]
    pub filename: String,
    #[serde_as(as = "DefaultOnNull")]
    pub content_type: String,
    #[serde_as(as = "DefaultOnNull")]
    pub size: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub height: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub width: u32,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageReference {
    #[serde_as(as = "DefaultOnNull")]
    pub message_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub ignore_get_message_error: bool,
}

/// Body of `MESSAGE_CREATE`, `AT_MESSAGE_CREATE` and `DIRECT_MESSAGE_CREATE`
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub channel_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub content: String,
    #[serde_as(as = "DefaultOnNull")]
    pub timestamp: String,
    #[serde_as(as = "DefaultOnNull")]
    pub edited_timestamp: String,
    #[serde_as(as = "DefaultOnNull")]
    pub mention_everyone: bool,
    pub author: Option<User>,
    #[serde_as(as = "DefaultOnNull")]
    pub attachments: Vec<MessageAttachment>,
    #[serde_as(as = "DefaultOnNull")]
    pub embeds: Vec<Value>,
    #[serde_as(as = "DefaultOnNull")]
    pub mentions: Vec<User>,
    pub member: Option<Member>,
    pub ark: Option<Value>,
    #[serde_as(as = "DefaultOnNull")]
    pub seq: u64,
    #[serde_as(as = "DefaultOnNull")]
    pub seq_in_channel: String,
    pub message_reference: Option<MessageReference>,
    /// Source guild of a direct message session
    #[serde_as(as = "DefaultOnNull")]
    pub src_guild_id: String,
}

impl Message {
    pub fn sent_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.timestamp)
    }

    pub fn edited_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.edited_timestamp)
    }
}

/// Body of the three message delete events
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageDelete {
    #[serde_as(as = "DefaultOnNull")]
    pub message: Message,
    #[serde_as(as = "DefaultOnNull")]
    pub op_user: User,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionTarget {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde(rename = "type")]
    pub target_type: Value,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emoji {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnNull")]
    pub emoji_type: u32,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageReaction {
    #[serde_as(as = "DefaultOnNull")]
    pub user_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub channel_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub target: ReactionTarget,
    #[serde_as(as = "DefaultOnNull")]
    pub emoji: Emoji,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageAudit {
    #[serde_as(as = "DefaultOnNull")]
    pub audit_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub message_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub channel_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub audit_time: String,
    #[serde_as(as = "DefaultOnNull")]
    pub create_time: String,
    #[serde_as(as = "DefaultOnNull")]
    pub seq_in_channel: String,
}

// ============================================================================
// Audio
// ============================================================================

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioAction {
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub channel_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub audio_url: String,
    #[serde_as(as = "DefaultOnNull")]
    pub text: String,
}

// ============================================================================
// Forum
// ============================================================================

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadInfo {
    #[serde_as(as = "DefaultOnNull")]
    pub thread_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub title: String,
    /// Rich text, encoded as a JSON string by the gateway
    #[serde_as(as = "DefaultOnNull")]
    pub content: String,
    #[serde_as(as = "DefaultOnNull")]
    pub date_time: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thread {
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub channel_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub author_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub thread_info: ThreadInfo,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostInfo {
    #[serde_as(as = "DefaultOnNull")]
    pub thread_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub post_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub content: String,
    #[serde_as(as = "DefaultOnNull")]
    pub date_time: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub channel_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub author_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub post_info: PostInfo,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyInfo {
    #[serde_as(as = "DefaultOnNull")]
    pub thread_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub post_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub reply_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub content: String,
    #[serde_as(as = "DefaultOnNull")]
    pub date_time: String,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reply {
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub channel_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub author_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub reply_info: ReplyInfo,
}

/// Result of a forum publish audit
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumAuditResult {
    #[serde_as(as = "DefaultOnNull")]
    pub task_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub channel_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub author_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub thread_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub post_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub reply_id: String,
    /// 1 thread, 2 post, 3 reply
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnNull")]
    pub publish_type: u32,
    /// 0 passed, 1 rejected
    #[serde_as(as = "DefaultOnNull")]
    pub result: u32,
    #[serde_as(as = "DefaultOnNull")]
    pub err_msg: String,
    #[serde_as(as = "DefaultOnNull")]
    pub date_time: String,
}

// ============================================================================
// Interaction
// ============================================================================

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionData {
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnNull")]
    pub data_type: u32,
    pub resolved: Value,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interaction {
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub application_id: String,
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnNull")]
    pub interaction_type: u32,
    pub data: Option<InteractionData>,
    #[serde_as(as = "DefaultOnNull")]
    pub guild_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub channel_id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub version: u32,
}
