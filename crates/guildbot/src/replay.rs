//! Replays recorded gateway frames through a dispatcher.
//!
//! Input holds one JSON frame per line, the way a connection loop would have
//! received them. Frames are dispatched strictly in order.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use guildbot_protocol::WsPayload;

use crate::config::ReplaySettings;
use crate::event::{Dispatcher, EventError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Lines that parsed as gateway frames
    pub frames: usize,
    pub dispatched: usize,
    pub failed: usize,
    /// Non-blank lines that were not frames
    pub invalid: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: not a gateway frame: {source}")]
    InvalidFrame {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {source}")]
    Dispatch {
        line: usize,
        #[source]
        source: EventError,
    },
}

pub struct Replay<'a, D: Dispatcher + ?Sized> {
    dispatcher: &'a D,
    settings: ReplaySettings,
}

impl<'a, D: Dispatcher + ?Sized> Replay<'a, D> {
    pub fn new(dispatcher: &'a D, settings: ReplaySettings) -> Self {
        Self {
            dispatcher,
            settings,
        }
    }

    /// Dispatch every frame read from `reader`
    pub async fn run<R>(&self, reader: R) -> Result<ReplayStats, ReplayError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut stats = ReplayStats::default();
        let mut lines = reader.lines();
        let mut line_no = 0;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let payload = match WsPayload::from_slice(line.as_bytes()) {
                Ok(payload) => payload,
                Err(source) => {
                    stats.invalid += 1;
                    if !self.settings.skip_invalid {
                        return Err(ReplayError::InvalidFrame {
                            line: line_no,
                            source,
                        });
                    }
                    tracing::warn!(line = line_no, error = %source, "skipping invalid frame");
                    continue;
                }
            };
            stats.frames += 1;

            match self.dispatcher.parse_and_handle(&payload) {
                Ok(()) => stats.dispatched += 1,
                Err(source) => {
                    stats.failed += 1;
                    if self.settings.stop_on_error {
                        return Err(ReplayError::Dispatch {
                            line: line_no,
                            source,
                        });
                    }
                    tracing::warn!(
                        line = line_no,
                        op = %payload.op_code,
                        error = %source,
                        "frame dispatch failed"
                    );
                }
            }
        }

        tracing::debug!(?stats, "replay finished");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::event::{EventHandler, HandlerSet};

    const FRAMES: &str = r#"
{"op":10,"d":{"heartbeat_interval":45000}}
{"op":0,"s":1,"t":"AT_MESSAGE_CREATE","d":{"id":"m1","content":"hello"}}
this is not json

{"op":0,"s":2,"t":"AT_MESSAGE_CREATE","d":{"id":42}}
{"op":0,"s":3,"t":"GUILD_CREATE","d":{"id":"g1"}}
{"op":11}
"#;

    fn counting_handlers(counter: Arc<AtomicUsize>) -> HandlerSet {
        HandlerSet::new(vec![EventHandler::at_message(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })])
    }

    #[tokio::test]
    async fn test_replay_tallies_frames() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handlers = counting_handlers(counter.clone());

        let stats = Replay::new(&handlers, ReplaySettings::default())
            .run(FRAMES.as_bytes())
            .await
            .unwrap();

        assert_eq!(
            stats,
            ReplayStats {
                frames: 5,
                dispatched: 4,
                failed: 1,
                invalid: 1,
            }
        );
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_replay_stops_on_invalid_line() {
        let handlers = counting_handlers(Arc::new(AtomicUsize::new(0)));
        let settings = ReplaySettings {
            stop_on_error: false,
            skip_invalid: false,
        };

        let err = Replay::new(&handlers, settings)
            .run(FRAMES.as_bytes())
            .await
            .unwrap_err();

        assert!(matches!(err, ReplayError::InvalidFrame { line: 4, .. }));
    }

    #[tokio::test]
    async fn test_replay_stops_on_dispatch_error() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handlers = counting_handlers(counter.clone());
        let settings = ReplaySettings {
            stop_on_error: true,
            skip_invalid: true,
        };

        let err = Replay::new(&handlers, settings)
            .run(FRAMES.as_bytes())
            .await
            .unwrap_err();

        match err {
            ReplayError::Dispatch { line, source } => {
                assert_eq!(line, 6);
                assert!(source.is_decode());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_replay_through_trait_object() {
        let handlers = HandlerSet::new(Vec::<EventHandler>::new());
        let dispatcher: &dyn Dispatcher = &handlers;

        let stats = Replay::new(dispatcher, ReplaySettings::default())
            .run(&b"{\"op\":1,\"d\":null}\n"[..])
            .await
            .unwrap();

        assert_eq!(stats.frames, 1);
        assert_eq!(stats.dispatched, 1);
    }
}
