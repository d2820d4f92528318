//! Sender/recipient command handlers: thin glue between the command surface
//! and the core components.

use std::sync::Arc;

use storage::{MailingList, Recipient};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, instrument};

use crate::core::{BotError, PageButton, PageControls};
use crate::namespace::derive_namespace;
use crate::runner::{AppContext, HandlerResult};
use crate::session::PagingSession;
use crate::telegram::{parse_broadcast, parse_create_list, parse_show_replies, Command};

/// Entry point for every parsed command. Non-private chats are ignored;
/// everything except /start and /help is gated on the admin allow-list.
#[instrument(skip(msg, ctx), fields(chat_id = msg.chat.id.0))]
pub async fn handle_command(msg: Message, cmd: Command, ctx: Arc<AppContext>) -> HandlerResult {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id.0;

    let result = match cmd {
        Command::Start => start(&ctx, chat_id, user).await,
        Command::Help => {
            ctx.transport
                .send_text(chat_id, &Command::descriptions().to_string())
                .await
                .map(|_| ())
        }
        _ if !ctx.config.is_admin(user_id) => {
            ctx.transport
                .send_text(chat_id, "This command is restricted to administrators.")
                .await
                .map(|_| ())
        }
        Command::CreateMailingList(args) => create_mailing_list(&ctx, chat_id, user_id, &args).await,
        Command::SendMessages(args) => send_messages(&ctx, chat_id, user_id, &args).await,
        Command::ShowReplies(args) => show_replies(&ctx, chat_id, user_id, &args).await,
        Command::NotificationsConfig => notifications_config(&ctx, chat_id).await,
        Command::TopicsStats => topics_stats(&ctx, chat_id, user_id).await,
    };

    match result {
        Ok(()) => Ok(()),
        // Usage mistakes and lookup misses become user-facing notices.
        Err(BotError::Validation(notice)) => {
            ctx.transport.send_text(chat_id, &notice).await?;
            Ok(())
        }
        Err(BotError::NotFound(what)) => {
            ctx.transport
                .send_text(chat_id, &format!("Nothing found: {}", what))
                .await?;
            Ok(())
        }
        Err(e) => {
            error!(error = %e, user_id, "Command failed");
            Err(e.into())
        }
    }
}

async fn start(
    ctx: &AppContext,
    chat_id: i64,
    user: &teloxide::types::User,
) -> crate::core::Result<()> {
    let user_id = user.id.0 as i64;
    let existing = ctx.db.recipients.get_by_tg_ids(&[user_id]).await?;
    if !existing.is_empty() {
        ctx.transport
            .send_text(
                chat_id,
                "You are already subscribed; we will message you as soon as there is something for you!",
            )
            .await?;
        return Ok(());
    }

    let username = user
        .username
        .clone()
        .unwrap_or_else(|| format!("id{}", user_id));
    ctx.db
        .recipients
        .add(&Recipient::new(user.full_name(), username, user_id))
        .await?;

    info!(user_id, "New recipient subscribed");
    ctx.transport
        .send_text(
            chat_id,
            "Welcome! You will now receive broadcasts from our partners.",
        )
        .await?;
    Ok(())
}

async fn create_mailing_list(
    ctx: &AppContext,
    chat_id: i64,
    user_id: i64,
    args: &str,
) -> crate::core::Result<()> {
    let args = parse_create_list(args)?;

    let found = ctx.db.recipients.get_by_usernames(&args.handles).await?;
    let missing: Vec<String> = args
        .handles
        .iter()
        .filter(|handle| !found.iter().any(|r| &r.tg_username == *handle))
        .map(|handle| format!("@{} is not connected to the bot", handle))
        .collect();

    if found.is_empty() {
        ctx.transport
            .send_text(
                chat_id,
                &format!("Could not create the list:\n{}", missing.join(",\n")),
            )
            .await?;
        return Ok(());
    }

    let recipient_ids: Vec<i64> = found.iter().map(|r| r.recipient_id).collect();
    let list_id = ctx
        .db
        .lists
        .add(
            &MailingList::new(user_id, args.list_name.clone()),
            &recipient_ids,
        )
        .await?;

    let mut reply = format!("Mailing list created! id={}", list_id);
    if !missing.is_empty() {
        reply.push_str(&format!(
            "\n\nSome users could not be added:\n{}",
            missing.join(",\n")
        ));
    }
    ctx.transport.send_text(chat_id, &reply).await?;
    Ok(())
}

async fn send_messages(
    ctx: &AppContext,
    chat_id: i64,
    user_id: i64,
    args: &str,
) -> crate::core::Result<()> {
    let args = parse_broadcast(args)?;

    let delivered = ctx
        .relay
        .broadcast(user_id, &args.topic, args.list_id, &args.body)
        .await?;

    ctx.transport
        .send_text(
            chat_id,
            &format!("Broadcast delivered to {} recipients!", delivered),
        )
        .await?;
    Ok(())
}

async fn show_replies(
    ctx: &AppContext,
    chat_id: i64,
    user_id: i64,
    args: &str,
) -> crate::core::Result<()> {
    let args = parse_show_replies(args)?;

    match args.topic {
        Some(topic_name) => {
            open_paging_session(ctx, chat_id, user_id, &topic_name, &args.search).await
        }
        None => {
            let topics = ctx.db.topics.list_by_sender(user_id).await?;
            if topics.is_empty() {
                ctx.transport
                    .send_text(chat_id, "You have no topics yet.")
                    .await?;
                return Ok(());
            }

            let rows = topics
                .iter()
                .map(|topic| {
                    vec![PageButton::active(
                        topic.topic_name.clone(),
                        format!("pick:{}", topic.topic_id),
                    )]
                })
                .collect();
            ctx.transport
                .send_with_controls(
                    chat_id,
                    "Pick a topic to browse its replies",
                    &PageControls { rows },
                )
                .await?;
            Ok(())
        }
    }
}

async fn notifications_config(ctx: &AppContext, chat_id: i64) -> crate::core::Result<()> {
    let controls = PageControls::single_row(vec![
        PageButton::active("Enable", "notif:on"),
        PageButton::active("Disable", "notif:off"),
    ]);
    ctx.transport
        .send_with_controls(chat_id, "Choose your notification settings", &controls)
        .await?;
    Ok(())
}

async fn topics_stats(ctx: &AppContext, chat_id: i64, user_id: i64) -> crate::core::Result<()> {
    let topics = ctx.db.topics.list_by_sender(user_id).await?;
    if topics.is_empty() {
        ctx.transport
            .send_text(chat_id, "You have no topics yet.")
            .await?;
        return Ok(());
    }

    let mut report = String::from("Per-topic stats:");
    for topic in &topics {
        let stats = ctx.db.messages.topic_stats(topic.topic_id).await?;
        report.push_str(&format!(
            "\n{}: sent {}; received {}",
            topic.topic_name, stats.sent, stats.received
        ));
    }

    ctx.transport.send_text(chat_id, &report).await?;
    Ok(())
}

/// Opens (or supersedes) the paging session for (viewer, topic) and renders
/// its first page. The token is deterministic, so a rerun replaces the old
/// session and any previously rendered keyboard keeps routing here.
pub(crate) async fn open_paging_session(
    ctx: &AppContext,
    chat_id: i64,
    owner_tg_id: i64,
    topic_name: &str,
    search: &str,
) -> crate::core::Result<()> {
    let token = derive_namespace(owner_tg_id, topic_name);
    let session = Arc::new(PagingSession::new(
        token,
        chat_id,
        owner_tg_id,
        topic_name.to_string(),
        search.to_string(),
    ));
    ctx.sessions.insert(session.clone()).await;

    ctx.pager.render(&session, 1).await
}
