//! Plain-text handler: relays replies to previously sent thread messages.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, instrument};

use crate::runner::{AppContext, HandlerResult};

/// Handles non-command text. Only messages that reply to something the bot
/// sent are interesting; everything else is ignored. An unmapped reply
/// target is an expected event (reply to an unrelated message) and is
/// dropped without error, as is a resolved message outside any thread.
#[instrument(skip(msg, ctx), fields(chat_id = msg.chat.id.0))]
pub async fn handle_text(msg: Message, ctx: Arc<AppContext>) -> HandlerResult {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(replied) = msg.reply_to_message() else {
        return Ok(());
    };

    let source = match ctx.resolver.resolve(replied.id.0 as i64).await {
        Ok(message) => message,
        Err(e) if e.is_not_found() => {
            debug!(reply_to = replied.id.0, "Ignoring reply to unknown message");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    ctx.relay.relay_reply(&source, text).await?;
    Ok(())
}
