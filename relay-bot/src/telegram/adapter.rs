//! Wraps teloxide::Bot and implements [`crate::core::Transport`]. Production
//! code talks to Telegram; tests substitute a mock or recording fake.

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId},
    ApiError, RequestError,
};

use crate::core::{BotError, PageControls, Result, SentMessage, Transport};

/// Callback payload attached to inert buttons; the dispatcher answers and
/// ignores it (Telegram requires callback buttons to carry non-empty data).
pub const NOOP_CALLBACK: &str = "noop";

/// Thin wrapper around teloxide::Bot that implements the Transport trait.
pub struct TelegramTransport {
    bot: teloxide::Bot,
}

impl TelegramTransport {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

/// Converts button rows into a teloxide inline keyboard.
pub fn to_inline_keyboard(controls: &PageControls) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = controls
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| match &button.callback_data {
                    Some(data) => {
                        InlineKeyboardButton::callback(button.label.clone(), data.clone())
                    }
                    None => InlineKeyboardButton::callback(button.label.clone(), NOOP_CALLBACK),
                })
                .collect()
        })
        .collect();

    InlineKeyboardMarkup::new(rows)
}

/// Editing a message to its current content is a Telegram API error, not a
/// transport failure; double navigation presses trigger it.
fn is_not_modified(err: &RequestError) -> bool {
    matches!(err, RequestError::Api(ApiError::MessageNotModified))
}

fn transport_err(err: RequestError) -> BotError {
    BotError::Transport(err.to_string())
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<SentMessage> {
        let sent = self
            .bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(transport_err)?;
        Ok(SentMessage {
            message_id: sent.id.0 as i64,
            sent_at: sent.date,
        })
    }

    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        match self
            .bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id as i32), text)
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_not_modified(&err) => Ok(()),
            Err(err) => Err(transport_err(err)),
        }
    }

    async fn send_with_controls(
        &self,
        chat_id: i64,
        text: &str,
        controls: &PageControls,
    ) -> Result<SentMessage> {
        let sent = self
            .bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(to_inline_keyboard(controls))
            .await
            .map_err(transport_err)?;
        Ok(SentMessage {
            message_id: sent.id.0 as i64,
            sent_at: sent.date,
        })
    }

    async fn edit_controls(
        &self,
        chat_id: i64,
        message_id: i64,
        controls: &PageControls,
    ) -> Result<()> {
        match self
            .bot
            .edit_message_reply_markup(ChatId(chat_id), MessageId(message_id as i32))
            .reply_markup(to_inline_keyboard(controls))
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if is_not_modified(&err) => Ok(()),
            Err(err) => Err(transport_err(err)),
        }
    }
}
