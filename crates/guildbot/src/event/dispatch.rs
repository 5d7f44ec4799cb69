use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_with::{serde_as, DefaultOnNull};

use guildbot_protocol::{EventType, Intent, WsPayload};

use super::error::EventError;
use super::handler::{EventCallback, ErrorNotifyHandler, HandlerKind, HandlerSet, ReadyHandler};

/// Routes received gateway frames to user callbacks
///
/// The session manager identifies with [`Dispatcher::intent`], hands every
/// received frame to [`Dispatcher::parse_and_handle`], and calls the ready and
/// error-notify handlers itself.
pub trait Dispatcher: Send + Sync {
    fn intent(&self) -> Intent;

    fn parse_and_handle(&self, payload: &WsPayload) -> Result<(), EventError>;

    fn ready_handler(&self) -> Option<&ReadyHandler>;

    fn error_notify_handler(&self) -> Option<&ErrorNotifyHandler>;
}

#[serde_as]
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
struct Frame<T> {
    #[serde_as(as = "DefaultOnNull")]
    d: T,
}

/// Decode the `d` field of a raw gateway frame.
///
/// A `null` field decodes to `T::default()`; a missing one is an error.
pub fn parse_data<T: DeserializeOwned + Default>(message: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice::<Frame<T>>(message).map(|frame| frame.d)
}

/// Decode the frame for `event_type`, then run `handler` if there is one.
///
/// Decoding happens even without a handler, so a malformed frame is reported
/// regardless of what is registered.
fn handle<T: DeserializeOwned + Default>(
    payload: &WsPayload,
    event_type: &EventType,
    handler: Option<&EventCallback<T>>,
) -> Result<(), EventError> {
    let data: T = parse_data(&payload.raw_message).map_err(|source| EventError::Decode {
        event_type: event_type.clone(),
        source,
    })?;
    match handler {
        Some(handler) => handler(payload, &data).map_err(|source| EventError::Handler {
            event_type: event_type.clone(),
            source,
        }),
        None => Ok(()),
    }
}

impl Dispatcher for HandlerSet {
    fn intent(&self) -> Intent {
        HandlerSet::intent(self)
    }

    fn parse_and_handle(&self, payload: &WsPayload) -> Result<(), EventError> {
        if !payload.op_code.is_dispatch() {
            return match &self.plain {
                Some(plain) => {
                    plain(payload, &payload.raw_message).map_err(|source| EventError::Plain {
                        op_code: payload.op_code,
                        source,
                    })
                }
                None => Ok(()),
            };
        }

        let Some(event_type) = &payload.event_type else {
            tracing::debug!(seq = payload.seq, "dispatch frame without event type");
            return Ok(());
        };

        let Some(kind) = HandlerKind::for_event(event_type) else {
            // READY and RESUMED belong to the session manager
            if let EventType::Unknown(tag) = event_type {
                tracing::debug!(tag = %tag, seq = payload.seq, "ignoring unknown event type");
            }
            return Ok(());
        };

        match kind {
            HandlerKind::Guild => handle(payload, event_type, self.guild.as_ref()),
            HandlerKind::GuildMember => handle(payload, event_type, self.guild_member.as_ref()),
            HandlerKind::Channel => handle(payload, event_type, self.channel.as_ref()),
            HandlerKind::Message => handle(payload, event_type, self.message.as_ref()),
            HandlerKind::MessageReaction => {
                handle(payload, event_type, self.message_reaction.as_ref())
            }
            HandlerKind::AtMessage => handle(payload, event_type, self.at_message.as_ref()),
            HandlerKind::DirectMessage => handle(payload, event_type, self.direct_message.as_ref()),
            HandlerKind::MessageAudit => handle(payload, event_type, self.message_audit.as_ref()),
            HandlerKind::MessageDelete => handle(payload, event_type, self.message_delete.as_ref()),
            HandlerKind::PublicMessageDelete => {
                handle(payload, event_type, self.public_message_delete.as_ref())
            }
            HandlerKind::DirectMessageDelete => {
                handle(payload, event_type, self.direct_message_delete.as_ref())
            }
            HandlerKind::Audio => handle(payload, event_type, self.audio.as_ref()),
            HandlerKind::Thread => handle(payload, event_type, self.thread.as_ref()),
            HandlerKind::Post => handle(payload, event_type, self.post.as_ref()),
            HandlerKind::Reply => handle(payload, event_type, self.reply.as_ref()),
            HandlerKind::ForumAudit => handle(payload, event_type, self.forum_audit.as_ref()),
            HandlerKind::Interaction => handle(payload, event_type, self.interaction.as_ref()),
            HandlerKind::Ready | HandlerKind::ErrorNotify | HandlerKind::Plain => Ok(()),
        }
    }

    fn ready_handler(&self) -> Option<&ReadyHandler> {
        HandlerSet::ready_handler(self)
    }

    fn error_notify_handler(&self) -> Option<&ErrorNotifyHandler> {
        HandlerSet::error_notify_handler(self)
    }
}
