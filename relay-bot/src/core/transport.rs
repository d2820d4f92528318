//! Transport abstraction for sending and editing messages.
//!
//! [`Transport`] is transport-agnostic; the teloxide adapter implements it in
//! production and tests substitute a mock or recording fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::Result;

/// Transport identifier and delivery timestamp of a sent message.
#[derive(Debug, Clone, Copy)]
pub struct SentMessage {
    pub message_id: i64,
    pub sent_at: DateTime<Utc>,
}

/// One button of a navigation row. `callback_data = None` renders an inert
/// placeholder that routes nowhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageButton {
    pub label: String,
    pub callback_data: Option<String>,
}

impl PageButton {
    pub fn active(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: Some(data.into()),
        }
    }

    pub fn inert(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: None,
        }
    }
}

/// An inline keyboard: the five-button navigation row of the paging view, or
/// a multi-row picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    pub rows: Vec<Vec<PageButton>>,
}

impl PageControls {
    pub fn single_row(buttons: Vec<PageButton>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }
}

/// Abstraction for sending and editing chat messages. `chat_id` and
/// `message_id` are transport identifiers (Telegram chat and message ids).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends text to a chat, returning the transport id and send time.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<SentMessage>;

    /// Edits the text of an already-sent message in place.
    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()>;

    /// Sends text together with a navigation row.
    async fn send_with_controls(
        &self,
        chat_id: i64,
        text: &str,
        controls: &PageControls,
    ) -> Result<SentMessage>;

    /// Replaces the navigation row attached to an already-sent message.
    async fn edit_controls(
        &self,
        chat_id: i64,
        message_id: i64,
        controls: &PageControls,
    ) -> Result<()>;
}
