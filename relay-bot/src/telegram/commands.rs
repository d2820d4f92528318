//! Bot command definitions and argument parsing for the sender surface.
//!
//! Argument validation happens here so the handlers only see well-formed
//! input; malformed arguments become `Validation` errors carrying the
//! user-facing usage notice.

use teloxide::utils::command::BotCommands;

use crate::core::{BotError, Result};

#[derive(BotCommands, Clone, Debug)]
#[command(
    rename_rule = "snake_case",
    description = "Broadcast and reply-relay commands:"
)]
pub enum Command {
    #[command(description = "subscribe to broadcasts")]
    Start,
    #[command(description = "create a mailing list: /create_mailing_list <name> <@user1> <@user2> ...")]
    CreateMailingList(String),
    #[command(description = "broadcast to a list: /send_messages <topic> <list_id> <body>")]
    SendMessages(String),
    #[command(description = "browse replies: /show_replies [<topic> [search_word]]")]
    ShowReplies(String),
    #[command(description = "notification settings")]
    NotificationsConfig,
    #[command(description = "per-topic sent/received message counts")]
    TopicsStats,
    #[command(description = "show this help")]
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CreateListArgs {
    pub list_name: String,
    /// Deduplicated handles with the `@` prefix stripped, in first-seen order.
    pub handles: Vec<String>,
}

pub fn parse_create_list(args: &str) -> Result<CreateListArgs> {
    let mut parts = args.split_whitespace();
    let list_name = parts
        .next()
        .ok_or_else(|| usage("/create_mailing_list <name> <@user1> <@user2> ..."))?
        .to_string();

    let mut handles: Vec<String> = Vec::new();
    for part in parts {
        let handle = part.trim_start_matches('@');
        if handle.is_empty() || handles.iter().any(|h| h == handle) {
            continue;
        }
        handles.push(handle.to_string());
    }

    if handles.is_empty() {
        return Err(usage("/create_mailing_list <name> <@user1> <@user2> ..."));
    }

    Ok(CreateListArgs { list_name, handles })
}

#[derive(Debug, PartialEq, Eq)]
pub struct BroadcastArgs {
    pub topic: String,
    pub list_id: i64,
    pub body: String,
}

pub fn parse_broadcast(args: &str) -> Result<BroadcastArgs> {
    let mut parts = args.splitn(3, char::is_whitespace);
    let topic = parts.next().unwrap_or_default();
    let list_id = parts.next().unwrap_or_default();
    let body = parts.next().unwrap_or_default().trim();

    if topic.is_empty() || body.is_empty() {
        return Err(usage("/send_messages <topic> <list_id> <body>"));
    }
    let list_id: i64 = list_id
        .parse()
        .map_err(|_| usage("/send_messages <topic> <list_id> <body>"))?;

    Ok(BroadcastArgs {
        topic: topic.to_string(),
        list_id,
        body: body.to_string(),
    })
}

#[derive(Debug, PartialEq, Eq)]
pub struct ShowRepliesArgs {
    /// None means "offer the topic picker keyboard".
    pub topic: Option<String>,
    pub search: String,
}

pub fn parse_show_replies(args: &str) -> Result<ShowRepliesArgs> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    match parts.as_slice() {
        [] => Ok(ShowRepliesArgs {
            topic: None,
            search: String::new(),
        }),
        [topic] => Ok(ShowRepliesArgs {
            topic: Some(topic.to_string()),
            search: String::new(),
        }),
        [topic, search] => Ok(ShowRepliesArgs {
            topic: Some(topic.to_string()),
            search: search.to_string(),
        }),
        _ => Err(usage("/show_replies [<topic> [search_word]]")),
    }
}

fn usage(format: &str) -> BotError {
    BotError::Validation(format!("Expected format: {}", format))
}
