//! Dispatcher integration tests
//!
//! These tests drive a HandlerSet the way a connection loop would:
//! - intent computation from the registered categories
//! - routing of every dispatch event to its category callback, and only there
//! - decode failures, unregistered and unknown events
//! - the plain fallback for control frames

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use guildbot::event::{Dispatcher, EventError, EventHandler, HandlerKind, HandlerSet};
use guildbot::protocol::{EventType, Intent, OpCode, ReadyData, WsPayload};

type Calls = Arc<Mutex<Vec<String>>>;

fn frame(raw: &str) -> WsPayload {
    WsPayload::from_slice(raw.as_bytes()).expect("test frame should parse")
}

fn calls(log: &Calls) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A handler of `kind` that does nothing
fn noop(kind: HandlerKind) -> EventHandler {
    match kind {
        HandlerKind::Ready => EventHandler::ready(|_, _| {}),
        HandlerKind::ErrorNotify => EventHandler::error_notify(|_| {}),
        HandlerKind::Plain => EventHandler::plain(|_, _| Ok(())),
        HandlerKind::Guild => EventHandler::guild(|_, _| Ok(())),
        HandlerKind::GuildMember => EventHandler::guild_member(|_, _| Ok(())),
        HandlerKind::Channel => EventHandler::channel(|_, _| Ok(())),
        HandlerKind::Message => EventHandler::message(|_, _| Ok(())),
        HandlerKind::MessageReaction => EventHandler::message_reaction(|_, _| Ok(())),
        HandlerKind::AtMessage => EventHandler::at_message(|_, _| Ok(())),
        HandlerKind::DirectMessage => EventHandler::direct_message(|_, _| Ok(())),
        HandlerKind::MessageAudit => EventHandler::message_audit(|_, _| Ok(())),
        HandlerKind::MessageDelete => EventHandler::message_delete(|_, _| Ok(())),
        HandlerKind::PublicMessageDelete => EventHandler::public_message_delete(|_, _| Ok(())),
        HandlerKind::DirectMessageDelete => EventHandler::direct_message_delete(|_, _| Ok(())),
        HandlerKind::Audio => EventHandler::audio(|_, _| Ok(())),
        HandlerKind::Thread => EventHandler::thread(|_, _| Ok(())),
        HandlerKind::Post => EventHandler::post(|_, _| Ok(())),
        HandlerKind::Reply => EventHandler::reply(|_, _| Ok(())),
        HandlerKind::ForumAudit => EventHandler::forum_audit(|_, _| Ok(())),
        HandlerKind::Interaction => EventHandler::interaction(|_, _| Ok(())),
    }
}

#[test]
fn test_intent_of_single_category() {
    for kind in HandlerKind::ALL {
        let set = HandlerSet::new(vec![noop(kind)]);
        assert_eq!(set.intent(), kind.intent(), "{kind}");
        assert_eq!(set.registered(), vec![kind]);
    }
}

#[test]
fn test_intent_is_or_of_registered_categories() {
    // Walk a spread of subsets of the 20 categories
    for mask in (0u32..1 << 20).step_by(7919) {
        let kinds: Vec<HandlerKind> = HandlerKind::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, kind)| kind)
            .collect();
        let expected: Intent = kinds.iter().map(HandlerKind::intent).collect();

        let set = HandlerSet::new(kinds.iter().copied().map(noop));
        assert_eq!(set.intent(), expected, "mask {mask:#x}");
        assert_eq!(Dispatcher::intent(&set), expected);
    }
}

#[test]
fn test_intent_of_common_bot() {
    let set = HandlerSet::new(vec![
        noop(HandlerKind::Ready),
        noop(HandlerKind::AtMessage),
        noop(HandlerKind::DirectMessage),
        noop(HandlerKind::GuildMember),
    ]);
    assert_eq!(
        set.intent(),
        Intent::PUBLIC_GUILD_MESSAGES | Intent::DIRECT_MESSAGE | Intent::GUILD_MEMBERS
    );
    assert_eq!(set.intent().bits(), (1 << 30) | (1 << 12) | (1 << 1));
}

#[test]
fn test_registered_category_receives_decoded_data() {
    let log = Calls::default();
    let recorder = log.clone();
    let set = HandlerSet::new(vec![EventHandler::at_message(move |payload, message| {
        let author = message.author.as_ref().map(|a| a.username.clone()).unwrap_or_default();
        recorder
            .lock()
            .unwrap()
            .push(format!("{}#{} {} {}", payload.event_type_name(), payload.seq, author, message.content));
        Ok(())
    })]);

    let payload = frame(
        r#"{"op":0,"s":9,"t":"AT_MESSAGE_CREATE","d":{
            "id":"m1","channel_id":"c1","guild_id":"g1",
            "content":"<@!1> ping","author":{"id":"u1","username":"alice"}
        }}"#,
    );
    set.parse_and_handle(&payload).unwrap();

    assert_eq!(calls(&log), vec!["AT_MESSAGE_CREATE#9 alice <@!1> ping"]);
}

#[test]
fn test_every_event_of_a_category_routes_to_it() {
    let log = Calls::default();
    let recorder = log.clone();
    let set = HandlerSet::new(vec![EventHandler::audio(move |payload, audio| {
        recorder
            .lock()
            .unwrap()
            .push(format!("{} {}", payload.event_type_name(), audio.channel_id));
        Ok(())
    })]);

    for event in HandlerKind::Audio.events() {
        let payload = WsPayload::dispatch(1, event, serde_json::json!({"channel_id": "voice"}));
        set.parse_and_handle(&payload).unwrap();
    }

    assert_eq!(
        calls(&log),
        vec![
            "AUDIO_START voice",
            "AUDIO_FINISH voice",
            "AUDIO_ON_MIC voice",
            "AUDIO_OFF_MIC voice",
        ]
    );
}

macro_rules! record {
    ($ctor:ident, $log:expr, |$data:ident| $guild:expr) => {{
        let log = $log.clone();
        EventHandler::$ctor(move |payload, $data| {
            log.lock().unwrap().push(format!(
                "{} {} {}",
                stringify!($ctor),
                payload.event_type_name(),
                $guild
            ));
            Ok(())
        })
    }};
}

/// A handler of `kind` recording "<kind> <event> <guild id>" for each call
fn recording(kind: HandlerKind, log: &Calls) -> EventHandler {
    match kind {
        HandlerKind::Ready | HandlerKind::ErrorNotify | HandlerKind::Plain => noop(kind),
        HandlerKind::Guild => record!(guild, log, |data| data.id),
        HandlerKind::GuildMember => record!(guild_member, log, |data| data.guild_id),
        HandlerKind::Channel => record!(channel, log, |data| data.guild_id),
        HandlerKind::Message => record!(message, log, |data| data.guild_id),
        HandlerKind::MessageReaction => record!(message_reaction, log, |data| data.guild_id),
        HandlerKind::AtMessage => record!(at_message, log, |data| data.guild_id),
        HandlerKind::DirectMessage => record!(direct_message, log, |data| data.guild_id),
        HandlerKind::MessageAudit => record!(message_audit, log, |data| data.guild_id),
        HandlerKind::MessageDelete => record!(message_delete, log, |data| data.message.guild_id),
        HandlerKind::PublicMessageDelete => {
            record!(public_message_delete, log, |data| data.message.guild_id)
        }
        HandlerKind::DirectMessageDelete => {
            record!(direct_message_delete, log, |data| data.message.guild_id)
        }
        HandlerKind::Audio => record!(audio, log, |data| data.guild_id),
        HandlerKind::Thread => record!(thread, log, |data| data.guild_id),
        HandlerKind::Post => record!(post, log, |data| data.guild_id),
        HandlerKind::Reply => record!(reply, log, |data| data.guild_id),
        HandlerKind::ForumAudit => record!(forum_audit, log, |data| data.guild_id),
        HandlerKind::Interaction => record!(interaction, log, |data| data.guild_id),
    }
}

#[test]
fn test_each_category_receives_exactly_its_events() {
    let routed: Vec<EventType> = EventType::KNOWN
        .into_iter()
        .filter(|event| HandlerKind::for_event(event).is_some())
        .collect();
    assert_eq!(routed.len(), 32);

    for kind in HandlerKind::ALL {
        let log = Calls::default();
        let set = HandlerSet::new(vec![recording(kind, &log)]);

        for (seq, event) in routed.iter().enumerate() {
            let data = serde_json::json!({
                "id": "g1",
                "guild_id": "g1",
                "message": {"guild_id": "g1"},
            });
            let payload = WsPayload::dispatch(seq as u32 + 1, event.clone(), data);
            set.parse_and_handle(&payload)
                .unwrap_or_else(|err| panic!("{kind} / {event}: {err}"));
        }

        let expected: Vec<String> = kind
            .events()
            .iter()
            .map(|event| format!("{kind} {event} g1"))
            .collect();
        assert_eq!(calls(&log), expected, "{kind}");
    }
}

#[test]
fn test_every_routed_event_belongs_to_one_category() {
    for event in EventType::KNOWN {
        let owners: Vec<HandlerKind> = HandlerKind::ALL
            .into_iter()
            .filter(|kind| kind.events().contains(&event))
            .collect();
        match HandlerKind::for_event(&event) {
            Some(kind) => assert_eq!(owners, vec![kind], "{event}"),
            None => assert!(owners.is_empty(), "{event}"),
        }
    }
}

#[test]
fn test_message_categories_are_kept_apart() {
    let log = Calls::default();
    let (a, b, c) = (log.clone(), log.clone(), log.clone());
    let set = HandlerSet::new(vec![
        EventHandler::message(move |_, m| {
            a.lock().unwrap().push(format!("message {}", m.id));
            Ok(())
        }),
        EventHandler::at_message(move |_, m| {
            b.lock().unwrap().push(format!("at {}", m.id));
            Ok(())
        }),
        EventHandler::direct_message(move |_, m| {
            c.lock().unwrap().push(format!("direct {}", m.id));
            Ok(())
        }),
    ]);

    set.parse_and_handle(&frame(r#"{"op":0,"t":"DIRECT_MESSAGE_CREATE","d":{"id":"1"}}"#))
        .unwrap();
    set.parse_and_handle(&frame(r#"{"op":0,"t":"MESSAGE_CREATE","d":{"id":"2"}}"#))
        .unwrap();
    set.parse_and_handle(&frame(r#"{"op":0,"t":"AT_MESSAGE_CREATE","d":{"id":"3"}}"#))
        .unwrap();

    assert_eq!(calls(&log), vec!["direct 1", "message 2", "at 3"]);
}

#[test]
fn test_unregistered_category_is_ignored() {
    let log = Calls::default();
    let recorder = log.clone();
    let set = HandlerSet::new(vec![EventHandler::guild(move |_, _| {
        recorder.lock().unwrap().push("guild".to_string());
        Ok(())
    })]);

    let payload = frame(r#"{"op":0,"t":"CHANNEL_CREATE","d":{"id":"c1","name":"general"}}"#);
    assert!(set.parse_and_handle(&payload).is_ok());
    assert!(calls(&log).is_empty());
}

#[test]
fn test_malformed_data_is_a_decode_error() {
    let log = Calls::default();
    let recorder = log.clone();
    let set = HandlerSet::new(vec![EventHandler::guild_member(move |_, _| {
        recorder.lock().unwrap().push("member".to_string());
        Ok(())
    })]);

    let wrong_shape = frame(r#"{"op":0,"t":"GUILD_MEMBER_ADD","d":{"roles":"admin"}}"#);
    let err = set.parse_and_handle(&wrong_shape).unwrap_err();
    match &err {
        EventError::Decode { event_type, .. } => {
            assert_eq!(*event_type, EventType::GuildMemberAdd)
        }
        other => panic!("expected decode error, got {other}"),
    }
    assert!(err.to_string().contains("GUILD_MEMBER_ADD"));

    let missing_data = frame(r#"{"op":0,"t":"GUILD_MEMBER_REMOVE"}"#);
    assert!(set.parse_and_handle(&missing_data).unwrap_err().is_decode());

    assert!(calls(&log).is_empty());
}

#[test]
fn test_control_frames_go_to_plain_handler_only() {
    let log = Calls::default();
    let (plain, message) = (log.clone(), log.clone());
    let set = HandlerSet::new(vec![
        EventHandler::plain(move |payload, raw| {
            plain
                .lock()
                .unwrap()
                .push(format!("plain op={} len={}", payload.op_code, raw.len()));
            Ok(())
        }),
        EventHandler::message(move |_, _| {
            message.lock().unwrap().push("message".to_string());
            Ok(())
        }),
    ]);

    let raw = r#"{"op":10,"t":"MESSAGE_CREATE","d":{"heartbeat_interval":45000}}"#;
    set.parse_and_handle(&frame(raw)).unwrap();
    set.parse_and_handle(&frame(r#"{"op":11}"#)).unwrap();

    assert_eq!(
        calls(&log),
        vec![format!("plain op=10 len={}", raw.len()), "plain op=11 len=9".to_string()]
    );
}

#[test]
fn test_control_frames_without_plain_handler() {
    let set = HandlerSet::new(vec![noop(HandlerKind::Message)]);
    let payload = frame(r#"{"op":7}"#);
    assert_eq!(payload.op_code, OpCode::Reconnect);
    assert!(set.parse_and_handle(&payload).is_ok());
}

#[test]
fn test_unknown_and_session_events_fall_through() {
    let log = Calls::default();
    let recorder = log.clone();
    let set = HandlerSet::new(vec![EventHandler::plain(move |_, _| {
        recorder.lock().unwrap().push("plain".to_string());
        Ok(())
    })]);

    set.parse_and_handle(&frame(r#"{"op":0,"t":"GROUP_AT_MESSAGE_CREATE","d":42}"#))
        .unwrap();
    set.parse_and_handle(&frame(r#"{"op":0,"t":"READY","d":{"session_id":"s"}}"#))
        .unwrap();
    set.parse_and_handle(&frame(r#"{"op":0,"d":{}}"#)).unwrap();

    assert!(calls(&log).is_empty());
}

#[test]
fn test_duplicate_registration_keeps_last() {
    let log = Calls::default();
    let (first, second) = (log.clone(), log.clone());
    let set = HandlerSet::new(vec![
        EventHandler::thread(move |_, _| {
            first.lock().unwrap().push("first".to_string());
            Ok(())
        }),
        EventHandler::thread(move |_, _| {
            second.lock().unwrap().push("second".to_string());
            Ok(())
        }),
    ]);

    let payload = frame(
        r#"{"op":0,"t":"FORUM_THREAD_CREATE","d":{"thread_info":{"thread_id":"t1","title":"hi"}}}"#,
    );
    set.parse_and_handle(&payload).unwrap();

    assert_eq!(calls(&log), vec!["second"]);
    assert_eq!(set.intent(), Intent::FORUMS);
}

#[test]
fn test_callback_errors_propagate() {
    let set = HandlerSet::new(vec![
        EventHandler::interaction(|_, interaction| Err(anyhow!("cannot answer {}", interaction.id))),
        EventHandler::plain(|_, _| Err(anyhow!("plain failed"))),
    ]);

    let err = set
        .parse_and_handle(&frame(r#"{"op":0,"t":"INTERACTION_CREATE","d":{"id":"i1"}}"#))
        .unwrap_err();
    match err {
        EventError::Handler { event_type, source } => {
            assert_eq!(event_type, EventType::InteractionCreate);
            assert_eq!(source.to_string(), "cannot answer i1");
        }
        other => panic!("expected handler error, got {other}"),
    }

    let err = set.parse_and_handle(&frame(r#"{"op":1,"d":3}"#)).unwrap_err();
    assert!(matches!(err, EventError::Plain { op_code: OpCode::Heartbeat, .. }));
}

#[test]
fn test_session_handlers_are_exposed() {
    let log = Calls::default();
    let (ready_log, error_log) = (log.clone(), log.clone());
    let set = HandlerSet::new(vec![
        EventHandler::ready(move |_, data: &ReadyData| {
            ready_log.lock().unwrap().push(format!("ready {}", data.session_id));
        }),
        EventHandler::error_notify(move |err| {
            error_log.lock().unwrap().push(format!("error {err}"));
        }),
    ]);
    assert!(set.intent().is_empty());

    let dispatcher: &dyn Dispatcher = &set;
    let payload = frame(r#"{"op":0,"s":1,"t":"READY","d":{"session_id":"abc","user":{"id":"1"}}}"#);
    let data: ReadyData = guildbot::event::parse_data(&payload.raw_message).unwrap();
    (dispatcher.ready_handler().unwrap())(&payload, &data);
    (dispatcher.error_notify_handler().unwrap())(&anyhow!("socket closed"));

    assert_eq!(calls(&log), vec!["ready abc", "error socket closed"]);
}
