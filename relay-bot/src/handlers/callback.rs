//! Static callback-query dispatcher.
//!
//! One endpoint receives every button press and pattern-matches the payload:
//! `pick:{topic_id}` opens a paging session, `notif:on|off` toggles the
//! notification setting, `{token}_{tag}:{page}` navigates the paging session
//! registered under the token. Unknown payloads (including the inert-button
//! noop and presses on keyboards from before a restart) are answered and
//! dropped. No handler is ever registered per button.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, instrument, warn};

use crate::handlers::commands::open_paging_session;
use crate::runner::{AppContext, HandlerResult};
use crate::telegram::NOOP_CALLBACK;

/// Parsed form of a callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    PickTopic(i64),
    Notifications(bool),
    Navigate { token: String, page: usize },
    Ignore,
}

/// Parses a raw callback payload. Never fails; anything unrecognized maps to
/// `Ignore`.
pub fn parse_callback(data: &str) -> CallbackAction {
    if data == NOOP_CALLBACK {
        return CallbackAction::Ignore;
    }
    if let Some(rest) = data.strip_prefix("pick:") {
        return match rest.parse() {
            Ok(topic_id) => CallbackAction::PickTopic(topic_id),
            Err(_) => CallbackAction::Ignore,
        };
    }
    match data {
        "notif:on" => return CallbackAction::Notifications(true),
        "notif:off" => return CallbackAction::Notifications(false),
        _ => {}
    }

    // Navigation payloads: `{token}_{tag}:{page}`. The token is URL-safe
    // base64 and may itself contain underscores, so the tag is split off the
    // right.
    if let Some((prefix, page)) = data.rsplit_once(':') {
        if let Some((token, _tag)) = prefix.rsplit_once('_') {
            if let Ok(page) = page.parse() {
                return CallbackAction::Navigate {
                    token: token.to_string(),
                    page,
                };
            }
        }
    }

    CallbackAction::Ignore
}

#[instrument(skip(bot, q, ctx), fields(user_id = %q.from.id))]
pub async fn handle_callback(bot: Bot, q: CallbackQuery, ctx: Arc<AppContext>) -> HandlerResult {
    let action = q
        .data
        .as_deref()
        .map(parse_callback)
        .unwrap_or(CallbackAction::Ignore);

    // Always answered, even for dropped payloads, so the client spinner
    // clears.
    bot.answer_callback_query(q.id.clone()).await?;

    let viewer_id = q.from.id.0 as i64;

    match action {
        CallbackAction::Ignore => {}
        CallbackAction::Notifications(enabled) => {
            ctx.db.settings.set_enabled(viewer_id, enabled).await?;
        }
        CallbackAction::PickTopic(topic_id) => {
            let topic = match ctx.db.topics.get_by_id(topic_id).await {
                Ok(topic) => topic,
                Err(e) if e.is_not_found() => {
                    debug!(topic_id, "Picked topic no longer exists");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            // Topic buttons are only offered to their owner; a mismatched
            // press means a stale or foreign keyboard.
            if topic.sender_tg_id != viewer_id {
                warn!(topic_id, viewer_id, "Topic pick from non-owner ignored");
                return Ok(());
            }

            open_paging_session(&ctx, viewer_id, viewer_id, &topic.topic_name, "").await?;
        }
        CallbackAction::Navigate { token, page } => {
            let Some(session) = ctx.sessions.get(&token).await else {
                debug!(%token, "Navigation press for unknown session (restart?)");
                return Ok(());
            };
            ctx.pager.render(&session, page).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_payloads() {
        assert_eq!(
            parse_callback("Ab3_xYz_next:2"),
            CallbackAction::Navigate {
                token: "Ab3_xYz".to_string(),
                page: 2
            }
        );
        assert_eq!(
            parse_callback("tok_first:1"),
            CallbackAction::Navigate {
                token: "tok".to_string(),
                page: 1
            }
        );
    }

    #[test]
    fn parses_picker_and_notifications() {
        assert_eq!(parse_callback("pick:7"), CallbackAction::PickTopic(7));
        assert_eq!(
            parse_callback("notif:on"),
            CallbackAction::Notifications(true)
        );
        assert_eq!(
            parse_callback("notif:off"),
            CallbackAction::Notifications(false)
        );
    }

    #[test]
    fn unknown_payloads_are_ignored() {
        assert_eq!(parse_callback("noop"), CallbackAction::Ignore);
        assert_eq!(parse_callback("pick:nan"), CallbackAction::Ignore);
        assert_eq!(parse_callback("tok_next:nan"), CallbackAction::Ignore);
        assert_eq!(parse_callback("no-separators"), CallbackAction::Ignore);
        assert_eq!(parse_callback(""), CallbackAction::Ignore);
    }
}
