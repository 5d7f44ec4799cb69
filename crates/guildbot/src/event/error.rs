use guildbot_protocol::{EventType, OpCode};

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("failed to decode {event_type} payload: {source}")]
    Decode {
        event_type: EventType,
        #[source]
        source: serde_json::Error,
    },

    #[error("{event_type} handler failed: {source}")]
    Handler {
        event_type: EventType,
        #[source]
        source: anyhow::Error,
    },

    #[error("plain handler failed for op {op_code}: {source}")]
    Plain {
        op_code: OpCode,
        #[source]
        source: anyhow::Error,
    },
}

impl EventError {
    pub fn is_decode(&self) -> bool {
        matches!(self, EventError::Decode { .. })
    }
}
