use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};
use tracing_subscriber::EnvFilter;

use guildbot::config::Settings;
use guildbot::event::{EventHandler, HandlerSet};
use guildbot::log::{ConsoleLogger, Level, Logger};
use guildbot::replay::Replay;
use guildbot::{log_error, log_info, log_warn};

/// Replay recorded gateway frames through the event dispatcher
#[derive(Debug, Parser)]
#[command(name = "guildbot-replay", version)]
struct Args {
    /// File with one gateway frame per line, stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Logger level, overrides `log.level` from the settings
    #[arg(short, long, env = "GUILDBOT_LEVEL")]
    level: Option<Level>,
}

fn handlers(logger: Arc<ConsoleLogger>) -> Vec<EventHandler> {
    let ready = logger.clone();
    let error_notify = logger.clone();
    let plain = logger.clone();
    let guild = logger.clone();
    let member = logger.clone();
    let channel = logger.clone();
    let message = logger.clone();
    let at_message = logger.clone();
    let direct_message = logger.clone();
    let reaction = logger.clone();
    let deleted = logger.clone();
    let public_deleted = logger.clone();
    let direct_deleted = logger.clone();
    let audit = logger.clone();
    let audio = logger.clone();
    let thread = logger.clone();
    let post = logger.clone();
    let reply = logger.clone();
    let forum = logger.clone();
    let interaction = logger;

    vec![
        EventHandler::ready(move |_, data| {
            log_info!(ready, "ready as {} (session {})", data.user.username, data.session_id);
        }),
        EventHandler::error_notify(move |err| {
            log_error!(error_notify, "connection error: {:#}", err);
        }),
        EventHandler::plain(move |payload, raw| {
            log_info!(plain, "op {} frame, {} bytes", payload.op_code, raw.len());
            Ok(())
        }),
        EventHandler::guild(move |payload, data| {
            log_info!(guild, "{} guild={} name={}", payload.event_type_name(), data.id, data.name);
            Ok(())
        }),
        EventHandler::guild_member(move |payload, data| {
            let user = data.user.as_ref().map(|u| u.username.as_str()).unwrap_or("?");
            log_info!(member, "{} guild={} user={}", payload.event_type_name(), data.guild_id, user);
            Ok(())
        }),
        EventHandler::channel(move |payload, data| {
            log_info!(channel, "{} channel={} name={}", payload.event_type_name(), data.id, data.name);
            Ok(())
        }),
        EventHandler::message(move |_, data| {
            log_info!(message, "message {} in {}: {}", data.id, data.channel_id, data.content);
            Ok(())
        }),
        EventHandler::at_message(move |_, data| {
            log_info!(at_message, "mentioned in {}: {}", data.channel_id, data.content);
            Ok(())
        }),
        EventHandler::direct_message(move |_, data| {
            log_info!(direct_message, "direct message {}: {}", data.id, data.content);
            Ok(())
        }),
        EventHandler::message_reaction(move |payload, data| {
            log_info!(reaction, "{} on {} by {}", payload.event_type_name(), data.target.id, data.user_id);
            Ok(())
        }),
        EventHandler::message_delete(move |_, data| {
            log_info!(deleted, "message {} deleted by {}", data.message.id, data.op_user.id);
            Ok(())
        }),
        EventHandler::public_message_delete(move |_, data| {
            log_info!(public_deleted, "public message {} deleted by {}", data.message.id, data.op_user.id);
            Ok(())
        }),
        EventHandler::direct_message_delete(move |_, data| {
            log_info!(direct_deleted, "direct message {} deleted by {}", data.message.id, data.op_user.id);
            Ok(())
        }),
        EventHandler::message_audit(move |payload, data| {
            log_info!(audit, "{} audit={} message={}", payload.event_type_name(), data.audit_id, data.message_id);
            Ok(())
        }),
        EventHandler::audio(move |payload, data| {
            log_info!(audio, "{} channel={}", payload.event_type_name(), data.channel_id);
            Ok(())
        }),
        EventHandler::thread(move |payload, data| {
            log_info!(
                thread,
                "{} thread={} title={}",
                payload.event_type_name(),
                data.thread_info.thread_id,
                data.thread_info.title
            );
            Ok(())
        }),
        EventHandler::post(move |payload, data| {
            log_info!(post, "{} thread={} post={}", payload.event_type_name(), data.post_info.thread_id, data.post_info.post_id);
            Ok(())
        }),
        EventHandler::reply(move |payload, data| {
            log_info!(reply, "{} post={} reply={}", payload.event_type_name(), data.reply_info.post_id, data.reply_info.reply_id);
            Ok(())
        }),
        EventHandler::forum_audit(move |_, data| {
            if data.result != 0 {
                log_warn!(forum, "forum publish {} rejected: {}", data.task_id, data.err_msg);
            }
            Ok(())
        }),
        EventHandler::interaction(move |_, data| {
            log_info!(interaction, "interaction {} type={}", data.id, data.interaction_type);
            Ok(())
        }),
    ]
}

async fn open_input(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings = Settings::new()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let level = args.level.unwrap_or(settings.log.level);
    let logger = Arc::new(ConsoleLogger::new(level));

    let handlers = HandlerSet::new(handlers(logger.clone()));
    tracing::info!(
        intent = %handlers.intent(),
        intent_bits = handlers.intent().bits(),
        registered = ?handlers.registered(),
        "guildbot-replay starting"
    );

    let input = open_input(args.input.as_ref()).await?;
    let stats = Replay::new(&handlers, settings.replay.clone())
        .run(input)
        .await?;

    log_info!(
        logger,
        "replayed {} frames: {} dispatched, {} failed, {} invalid lines",
        stats.frames,
        stats.dispatched,
        stats.failed,
        stats.invalid
    );
    logger.sync()?;

    Ok(())
}
