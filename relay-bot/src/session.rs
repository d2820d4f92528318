//! In-process session state: the reply index and the paging session registry.
//!
//! Both maps are shared across concurrently dispatched updates and are
//! guarded by a mutex around every read and write. Entries live for the
//! process lifetime and reset on restart.

use std::collections::HashMap;
use std::sync::Arc;

use storage::MessageRecord;
use tokio::sync::Mutex;

/// Maps a rendered transport message id to the thread message it displays,
/// so a direct reply to a rendered slot resolves without a database lookup.
#[derive(Clone, Default)]
pub struct ReplyIndex {
    inner: Arc<Mutex<HashMap<i64, MessageRecord>>>,
}

impl ReplyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, tg_message_id: i64, message: MessageRecord) {
        self.inner.lock().await.insert(tg_message_id, message);
    }

    pub async fn lookup(&self, tg_message_id: i64) -> Option<MessageRecord> {
        self.inner.lock().await.get(&tg_message_id).cloned()
    }
}

/// One rendered slot message: its transport id and the text it currently
/// shows. Keeping the text lets the renderer skip no-op edits (Telegram
/// rejects editing a message to its current content).
#[derive(Debug, Clone)]
pub struct RenderedSlot {
    pub message_id: i64,
    pub text: String,
}

/// Mutable part of one paging session, locked independently per session so
/// concurrent sessions never share page state.
#[derive(Debug, Default)]
pub struct PageState {
    pub page: usize,
    pub total_pages: usize,
    /// Rendered slot messages, reused via edits across page navigations.
    pub slots: Vec<RenderedSlot>,
    /// Transport id of the message carrying the navigation row.
    pub keyboard_message_id: Option<i64>,
}

/// One "show replies" viewing session: who is looking at which topic, plus
/// the rendered-slot state the pagination engine edits in place.
pub struct PagingSession {
    /// Namespace token; also the registry key and callback-data prefix.
    pub token: String,
    /// Chat the slots and keyboard are rendered into.
    pub chat_id: i64,
    /// Sender identity that owns the topic being browsed.
    pub owner_tg_id: i64,
    pub topic_name: String,
    /// Literal substring filter; empty means unfiltered.
    pub search_filter: String,
    state: Mutex<PageState>,
}

impl PagingSession {
    pub fn new(
        token: String,
        chat_id: i64,
        owner_tg_id: i64,
        topic_name: String,
        search_filter: String,
    ) -> Self {
        Self {
            token,
            chat_id,
            owner_tg_id,
            topic_name,
            search_filter,
            state: Mutex::new(PageState::default()),
        }
    }

    pub async fn state(&self) -> tokio::sync::MutexGuard<'_, PageState> {
        self.state.lock().await
    }
}

/// Registry of live paging sessions keyed by namespace token. The callback
/// dispatcher looks the owning session up here instead of registering
/// per-button handlers.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<String, Arc<PagingSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session, replacing any previous session with the same
    /// token (the token is deterministic per (viewer, topic), so re-running
    /// show-replies supersedes the old keyboard instead of leaking it).
    pub async fn insert(&self, session: Arc<PagingSession>) {
        self.inner
            .lock()
            .await
            .insert(session.token.clone(), session);
    }

    pub async fn get(&self, token: &str) -> Option<Arc<PagingSession>> {
        self.inner.lock().await.get(token).cloned()
    }
}
