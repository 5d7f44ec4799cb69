use std::fmt;

use guildbot_protocol::{
    event_to_intent, AudioAction, Channel, EventType, ForumAuditResult, Guild, Intent,
    Interaction, Member, Message, MessageAudit, MessageDelete, MessageReaction, Post, ReadyData,
    Reply, Thread, WsPayload,
};

/// Result returned by user callbacks
pub type HandlerResult = anyhow::Result<()>;

/// Callback for one event category, receiving the frame and its decoded data
pub type EventCallback<T> = Box<dyn Fn(&WsPayload, &T) -> HandlerResult + Send + Sync>;

/// Called by the session manager once `READY` arrives
pub type ReadyHandler = Box<dyn Fn(&WsPayload, &ReadyData) + Send + Sync>;

/// Called by the session manager when the connection fails
pub type ErrorNotifyHandler = Box<dyn Fn(&anyhow::Error) + Send + Sync>;

/// Fallback for every non-dispatch frame, receiving the raw bytes
pub type PlainEventHandler = Box<dyn Fn(&WsPayload, &[u8]) -> HandlerResult + Send + Sync>;

// ============================================================================
// Handler Kind
// ============================================================================

/// Event category a callback can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Ready,
    ErrorNotify,
    Plain,
    Guild,
    GuildMember,
    Channel,
    Message,
    MessageReaction,
    AtMessage,
    DirectMessage,
    MessageAudit,
    MessageDelete,
    PublicMessageDelete,
    DirectMessageDelete,
    Audio,
    Thread,
    Post,
    Reply,
    ForumAudit,
    Interaction,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 20] = [
        HandlerKind::Ready,
        HandlerKind::ErrorNotify,
        HandlerKind::Plain,
        HandlerKind::Guild,
        HandlerKind::GuildMember,
        HandlerKind::Channel,
        HandlerKind::Message,
        HandlerKind::MessageReaction,
        HandlerKind::AtMessage,
        HandlerKind::DirectMessage,
        HandlerKind::MessageAudit,
        HandlerKind::MessageDelete,
        HandlerKind::PublicMessageDelete,
        HandlerKind::DirectMessageDelete,
        HandlerKind::Audio,
        HandlerKind::Thread,
        HandlerKind::Post,
        HandlerKind::Reply,
        HandlerKind::ForumAudit,
        HandlerKind::Interaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerKind::Ready => "ready",
            HandlerKind::ErrorNotify => "error_notify",
            HandlerKind::Plain => "plain",
            HandlerKind::Guild => "guild",
            HandlerKind::GuildMember => "guild_member",
            HandlerKind::Channel => "channel",
            HandlerKind::Message => "message",
            HandlerKind::MessageReaction => "message_reaction",
            HandlerKind::AtMessage => "at_message",
            HandlerKind::DirectMessage => "direct_message",
            HandlerKind::MessageAudit => "message_audit",
            HandlerKind::MessageDelete => "message_delete",
            HandlerKind::PublicMessageDelete => "public_message_delete",
            HandlerKind::DirectMessageDelete => "direct_message_delete",
            HandlerKind::Audio => "audio",
            HandlerKind::Thread => "thread",
            HandlerKind::Post => "post",
            HandlerKind::Reply => "reply",
            HandlerKind::ForumAudit => "forum_audit",
            HandlerKind::Interaction => "interaction",
        }
    }

    /// Category a dispatch event is routed to.
    ///
    /// `READY`, `RESUMED` and unknown tags belong to no category.
    pub fn for_event(event_type: &EventType) -> Option<HandlerKind> {
        let kind = match event_type {
            EventType::GuildCreate | EventType::GuildUpdate | EventType::GuildDelete => {
                HandlerKind::Guild
            }
            EventType::ChannelCreate | EventType::ChannelUpdate | EventType::ChannelDelete => {
                HandlerKind::Channel
            }
            EventType::GuildMemberAdd
            | EventType::GuildMemberUpdate
            | EventType::GuildMemberRemove => HandlerKind::GuildMember,
            EventType::MessageCreate => HandlerKind::Message,
            EventType::MessageDelete => HandlerKind::MessageDelete,
            EventType::MessageReactionAdd | EventType::MessageReactionRemove => {
                HandlerKind::MessageReaction
            }
            EventType::AtMessageCreate => HandlerKind::AtMessage,
            EventType::PublicMessageDelete => HandlerKind::PublicMessageDelete,
            EventType::DirectMessageCreate => HandlerKind::DirectMessage,
            EventType::DirectMessageDelete => HandlerKind::DirectMessageDelete,
            EventType::AudioStart
            | EventType::AudioFinish
            | EventType::AudioOnMic
            | EventType::AudioOffMic => HandlerKind::Audio,
            EventType::MessageAuditPass | EventType::MessageAuditReject => HandlerKind::MessageAudit,
            EventType::ForumThreadCreate
            | EventType::ForumThreadUpdate
            | EventType::ForumThreadDelete => HandlerKind::Thread,
            EventType::ForumPostCreate | EventType::ForumPostDelete => HandlerKind::Post,
            EventType::ForumReplyCreate | EventType::ForumReplyDelete => HandlerKind::Reply,
            EventType::ForumAuditResult => HandlerKind::ForumAudit,
            EventType::InteractionCreate => HandlerKind::Interaction,
            EventType::Ready | EventType::Resumed | EventType::Unknown(_) => return None,
        };
        Some(kind)
    }

    /// Dispatch events routed to this category
    pub fn events(&self) -> Vec<EventType> {
        EventType::KNOWN
            .into_iter()
            .filter(|event_type| HandlerKind::for_event(event_type) == Some(*self))
            .collect()
    }

    /// Intents needed to receive every event of this category
    pub fn intent(&self) -> Intent {
        event_to_intent(&self.events())
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Event Handler
// ============================================================================

/// A callback tagged with the category it handles
pub enum EventHandler {
    Ready(ReadyHandler),
    ErrorNotify(ErrorNotifyHandler),
    Plain(PlainEventHandler),
    Guild(EventCallback<Guild>),
    GuildMember(EventCallback<Member>),
    Channel(EventCallback<Channel>),
    Message(EventCallback<Message>),
    MessageReaction(EventCallback<MessageReaction>),
    AtMessage(EventCallback<Message>),
    DirectMessage(EventCallback<Message>),
    MessageAudit(EventCallback<MessageAudit>),
    MessageDelete(EventCallback<MessageDelete>),
    PublicMessageDelete(EventCallback<MessageDelete>),
    DirectMessageDelete(EventCallback<MessageDelete>),
    Audio(EventCallback<AudioAction>),
    Thread(EventCallback<Thread>),
    Post(EventCallback<Post>),
    Reply(EventCallback<Reply>),
    ForumAudit(EventCallback<ForumAuditResult>),
    Interaction(EventCallback<Interaction>),
}

impl EventHandler {
    pub fn ready<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &ReadyData) + Send + Sync + 'static,
    {
        Self::Ready(Box::new(f))
    }

    pub fn error_notify<F>(f: F) -> Self
    where
        F: Fn(&anyhow::Error) + Send + Sync + 'static,
    {
        Self::ErrorNotify(Box::new(f))
    }

    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &[u8]) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Plain(Box::new(f))
    }

    pub fn guild<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &Guild) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Guild(Box::new(f))
    }

    pub fn guild_member<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &Member) -> HandlerResult + Send + Sync + 'static,
    {
        Self::GuildMember(Box::new(f))
    }

    pub fn channel<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &Channel) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Channel(Box::new(f))
    }

    pub fn message<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &Message) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Message(Box::new(f))
    }

    pub fn message_reaction<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &MessageReaction) -> HandlerResult + Send + Sync + 'static,
    {
        Self::MessageReaction(Box::new(f))
    }

    pub fn at_message<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &Message) -> HandlerResult + Send + Sync + 'static,
    {
        Self::AtMessage(Box::new(f))
    }

    pub fn direct_message<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &Message) -> HandlerResult + Send + Sync + 'static,
    {
        Self::DirectMessage(Box::new(f))
    }

    pub fn message_audit<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &MessageAudit) -> HandlerResult + Send + Sync + 'static,
    {
        Self::MessageAudit(Box::new(f))
    }

    pub fn message_delete<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &MessageDelete) -> HandlerResult + Send + Sync + 'static,
    {
        Self::MessageDelete(Box::new(f))
    }

    pub fn public_message_delete<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &MessageDelete) -> HandlerResult + Send + Sync + 'static,
    {
        Self::PublicMessageDelete(Box::new(f))
    }

    pub fn direct_message_delete<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &MessageDelete) -> HandlerResult + Send + Sync + 'static,
    {
        Self::DirectMessageDelete(Box::new(f))
    }

    pub fn audio<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &AudioAction) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Audio(Box::new(f))
    }

    pub fn thread<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &Thread) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Thread(Box::new(f))
    }

    pub fn post<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &Post) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Post(Box::new(f))
    }

    pub fn reply<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &Reply) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Reply(Box::new(f))
    }

    pub fn forum_audit<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &ForumAuditResult) -> HandlerResult + Send + Sync + 'static,
    {
        Self::ForumAudit(Box::new(f))
    }

    pub fn interaction<F>(f: F) -> Self
    where
        F: Fn(&WsPayload, &Interaction) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Interaction(Box::new(f))
    }

    pub fn kind(&self) -> HandlerKind {
        match self {
            EventHandler::Ready(_) => HandlerKind::Ready,
            EventHandler::ErrorNotify(_) => HandlerKind::ErrorNotify,
            EventHandler::Plain(_) => HandlerKind::Plain,
            EventHandler::Guild(_) => HandlerKind::Guild,
            EventHandler::GuildMember(_) => HandlerKind::GuildMember,
            EventHandler::Channel(_) => HandlerKind::Channel,
            EventHandler::Message(_) => HandlerKind::Message,
            EventHandler::MessageReaction(_) => HandlerKind::MessageReaction,
            EventHandler::AtMessage(_) => HandlerKind::AtMessage,
            EventHandler::DirectMessage(_) => HandlerKind::DirectMessage,
            EventHandler::MessageAudit(_) => HandlerKind::MessageAudit,
            EventHandler::MessageDelete(_) => HandlerKind::MessageDelete,
            EventHandler::PublicMessageDelete(_) => HandlerKind::PublicMessageDelete,
            EventHandler::DirectMessageDelete(_) => HandlerKind::DirectMessageDelete,
            EventHandler::Audio(_) => HandlerKind::Audio,
            EventHandler::Thread(_) => HandlerKind::Thread,
            EventHandler::Post(_) => HandlerKind::Post,
            EventHandler::Reply(_) => HandlerKind::Reply,
            EventHandler::ForumAudit(_) => HandlerKind::ForumAudit,
            EventHandler::Interaction(_) => HandlerKind::Interaction,
        }
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventHandler").field(&self.kind()).finish()
    }
}

// ============================================================================
// Handler Set
// ============================================================================

/// Registered callbacks, at most one per category
///
/// Built once with [`HandlerSet::new`] and read-only afterwards, so it can be
/// shared with the connection loop without locking.
#[derive(Default)]
pub struct HandlerSet {
    pub(crate) ready: Option<ReadyHandler>,
    pub(crate) error_notify: Option<ErrorNotifyHandler>,
    pub(crate) plain: Option<PlainEventHandler>,

    pub(crate) guild: Option<EventCallback<Guild>>,
    pub(crate) guild_member: Option<EventCallback<Member>>,
    pub(crate) channel: Option<EventCallback<Channel>>,

    pub(crate) message: Option<EventCallback<Message>>,
    pub(crate) message_reaction: Option<EventCallback<MessageReaction>>,
    pub(crate) at_message: Option<EventCallback<Message>>,
    pub(crate) direct_message: Option<EventCallback<Message>>,
    pub(crate) message_audit: Option<EventCallback<MessageAudit>>,
    pub(crate) message_delete: Option<EventCallback<MessageDelete>>,
    pub(crate) public_message_delete: Option<EventCallback<MessageDelete>>,
    pub(crate) direct_message_delete: Option<EventCallback<MessageDelete>>,

    pub(crate) audio: Option<EventCallback<AudioAction>>,

    pub(crate) thread: Option<EventCallback<Thread>>,
    pub(crate) post: Option<EventCallback<Post>>,
    pub(crate) reply: Option<EventCallback<Reply>>,
    pub(crate) forum_audit: Option<EventCallback<ForumAuditResult>>,

    pub(crate) interaction: Option<EventCallback<Interaction>>,

    intent: Intent,
}

impl HandlerSet {
    /// Register `handlers` and compute the intents they need.
    ///
    /// A second handler for the same category replaces the first.
    pub fn new<I>(handlers: I) -> Self
    where
        I: IntoIterator<Item = EventHandler>,
    {
        let mut set = HandlerSet::default();
        for handler in handlers {
            let kind = handler.kind();
            if set.is_registered(kind) {
                tracing::warn!(kind = %kind, "handler registered twice, keeping the last one");
            }
            set.intent |= kind.intent();
            set.insert(handler);
        }
        tracing::debug!(intent = %set.intent, "registered event handlers");
        set
    }

    fn insert(&mut self, handler: EventHandler) {
        match handler {
            EventHandler::Ready(h) => self.ready = Some(h),
            EventHandler::ErrorNotify(h) => self.error_notify = Some(h),
            EventHandler::Plain(h) => self.plain = Some(h),
            EventHandler::Guild(h) => self.guild = Some(h),
            EventHandler::GuildMember(h) => self.guild_member = Some(h),
            EventHandler::Channel(h) => self.channel = Some(h),
            EventHandler::Message(h) => self.message = Some(h),
            EventHandler::MessageReaction(h) => self.message_reaction = Some(h),
            EventHandler::AtMessage(h) => self.at_message = Some(h),
            EventHandler::DirectMessage(h) => self.direct_message = Some(h),
            EventHandler::MessageAudit(h) => self.message_audit = Some(h),
            EventHandler::MessageDelete(h) => self.message_delete = Some(h),
            EventHandler::PublicMessageDelete(h) => self.public_message_delete = Some(h),
            EventHandler::DirectMessageDelete(h) => self.direct_message_delete = Some(h),
            EventHandler::Audio(h) => self.audio = Some(h),
            EventHandler::Thread(h) => self.thread = Some(h),
            EventHandler::Post(h) => self.post = Some(h),
            EventHandler::Reply(h) => self.reply = Some(h),
            EventHandler::ForumAudit(h) => self.forum_audit = Some(h),
            EventHandler::Interaction(h) => self.interaction = Some(h),
        }
    }

    /// Intents required by the registered categories
    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn ready_handler(&self) -> Option<&ReadyHandler> {
        self.ready.as_ref()
    }

    pub fn error_notify_handler(&self) -> Option<&ErrorNotifyHandler> {
        self.error_notify.as_ref()
    }

    pub fn is_registered(&self, kind: HandlerKind) -> bool {
        match kind {
            HandlerKind::Ready => self.ready.is_some(),
            HandlerKind::ErrorNotify => self.error_notify.is_some(),
            HandlerKind::Plain => self.plain.is_some(),
            HandlerKind::Guild => self.guild.is_some(),
            HandlerKind::GuildMember => self.guild_member.is_some(),
            HandlerKind::Channel => self.channel.is_some(),
            HandlerKind::Message => self.message.is_some(),
            HandlerKind::MessageReaction => self.message_reaction.is_some(),
            HandlerKind::AtMessage => self.at_message.is_some(),
            HandlerKind::DirectMessage => self.direct_message.is_some(),
            HandlerKind::MessageAudit => self.message_audit.is_some(),
            HandlerKind::MessageDelete => self.message_delete.is_some(),
            HandlerKind::PublicMessageDelete => self.public_message_delete.is_some(),
            HandlerKind::DirectMessageDelete => self.direct_message_delete.is_some(),
            HandlerKind::Audio => self.audio.is_some(),
            HandlerKind::Thread => self.thread.is_some(),
            HandlerKind::Post => self.post.is_some(),
            HandlerKind::Reply => self.reply.is_some(),
            HandlerKind::ForumAudit => self.forum_audit.is_some(),
            HandlerKind::Interaction => self.interaction.is_some(),
        }
    }

    /// Categories that currently have a callback
    pub fn registered(&self) -> Vec<HandlerKind> {
        HandlerKind::ALL
            .into_iter()
            .filter(|kind| self.is_registered(*kind))
            .collect()
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSet")
            .field("registered", &self.registered())
            .field("intent", &self.intent)
            .finish()
    }
}
