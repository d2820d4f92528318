//! End-to-end flows over an in-memory database and a recording transport:
//! broadcast delivery, reply relays in both directions, the notifications
//! toggle, and slot-reusing pagination.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use relay_bot::core::Result as BotResult;
use relay_bot::{
    derive_namespace, PageControls, PagingSession, RelayDispatcher, ReplyIndex, ReplyPager,
    SentMessage, SessionRegistry, ThreadResolver, Transport, BLANK_SLOT,
};
use storage::{Database, Direction, MailingList, MessageRecord, Recipient};

/// What the bot asked the transport to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Send {
        chat_id: i64,
        text: String,
    },
    Edit {
        chat_id: i64,
        message_id: i64,
        text: String,
    },
    SendControls {
        chat_id: i64,
        text: String,
        controls: PageControls,
    },
    EditControls {
        chat_id: i64,
        message_id: i64,
        controls: PageControls,
    },
}

/// Transport fake that records every call and hands out deterministic
/// incrementing message ids.
struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
}

impl RecordingTransport {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(100),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn sent(&self) -> SentMessage {
        SentMessage {
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            sent_at: Utc::now(),
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> BotResult<SentMessage> {
        let sent = self.sent();
        self.calls.lock().unwrap().push(Call::Send {
            chat_id,
            text: text.to_string(),
        });
        Ok(sent)
    }

    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str) -> BotResult<()> {
        self.calls.lock().unwrap().push(Call::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_with_controls(
        &self,
        chat_id: i64,
        text: &str,
        controls: &PageControls,
    ) -> BotResult<SentMessage> {
        let sent = self.sent();
        self.calls.lock().unwrap().push(Call::SendControls {
            chat_id,
            text: text.to_string(),
            controls: controls.clone(),
        });
        Ok(sent)
    }

    async fn edit_controls(
        &self,
        chat_id: i64,
        message_id: i64,
        controls: &PageControls,
    ) -> BotResult<()> {
        self.calls.lock().unwrap().push(Call::EditControls {
            chat_id,
            message_id,
            controls: controls.clone(),
        });
        Ok(())
    }
}

const SENDER_TG_ID: i64 = 1000;

struct Fixture {
    db: Database,
    transport: Arc<RecordingTransport>,
    relay: RelayDispatcher,
    alice_id: i64,
    bob_id: i64,
    list_id: i64,
}

/// Fresh database with two subscribed recipients and one mailing list.
async fn setup() -> Fixture {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    let alice_id = db
        .recipients
        .add(&Recipient::new("Alice".to_string(), "alice".to_string(), 11))
        .await
        .expect("Failed to add alice");
    let bob_id = db
        .recipients
        .add(&Recipient::new("Bob".to_string(), "bob".to_string(), 22))
        .await
        .expect("Failed to add bob");

    let list_id = db
        .lists
        .add(
            &MailingList::new(SENDER_TG_ID, "partners".to_string()),
            &[alice_id, bob_id],
        )
        .await
        .expect("Failed to create list");

    let transport = Arc::new(RecordingTransport::new());
    let relay = RelayDispatcher::new(transport.clone(), db.clone());

    Fixture {
        db,
        transport,
        relay,
        alice_id,
        bob_id,
        list_id,
    }
}

#[tokio::test]
async fn broadcast_delivers_to_every_member_and_persists_legs() {
    let fx = setup().await;

    let delivered = fx
        .relay
        .broadcast(SENDER_TG_ID, "launch", fx.list_id, "We are live!")
        .await
        .expect("Broadcast failed");
    assert_eq!(delivered, 2);

    let calls = fx.transport.calls();
    assert_eq!(
        calls,
        vec![
            Call::Send {
                chat_id: 11,
                text: "We are live!".to_string()
            },
            Call::Send {
                chat_id: 22,
                text: "We are live!".to_string()
            },
        ]
    );

    let topic = fx
        .db
        .topics
        .get_by_name_and_sender("launch", SENDER_TG_ID)
        .await
        .expect("Topic was not created");
    let messages = fx
        .db
        .messages
        .get_by_topic(topic.topic_id)
        .await
        .expect("Failed to load messages");
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.direction == Direction::FromSender));
    assert!(messages.iter().all(|m| m.list_id == fx.list_id));
}

#[tokio::test]
async fn recipient_reply_reaches_sender_when_notifications_on() {
    let fx = setup().await;
    fx.relay
        .broadcast(SENDER_TG_ID, "launch", fx.list_id, "We are live!")
        .await
        .expect("Broadcast failed");
    fx.transport.clear();

    let topic = fx
        .db
        .topics
        .get_by_name_and_sender("launch", SENDER_TG_ID)
        .await
        .unwrap();
    let broadcast_leg = fx.db.messages.get_by_topic(topic.topic_id).await.unwrap()[0].clone();

    fx.relay
        .relay_reply(&broadcast_leg, "Congrats!")
        .await
        .expect("Relay failed");

    assert_eq!(
        fx.transport.calls(),
        vec![Call::Send {
            chat_id: SENDER_TG_ID,
            text: "Congrats!".to_string()
        }]
    );

    let replies = fx
        .db
        .messages
        .get_replies_by_topic(topic.topic_id)
        .await
        .unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].body, "Congrats!");
    assert_eq!(replies[0].recipient_id, broadcast_leg.recipient_id);
    assert!(!replies[0].is_undelivered());
}

#[tokio::test]
async fn recipient_reply_is_stored_undelivered_when_notifications_off() {
    let fx = setup().await;
    fx.relay
        .broadcast(SENDER_TG_ID, "launch", fx.list_id, "We are live!")
        .await
        .expect("Broadcast failed");
    fx.transport.clear();

    fx.db
        .settings
        .set_enabled(SENDER_TG_ID, false)
        .await
        .expect("Failed to disable notifications");

    let topic = fx
        .db
        .topics
        .get_by_name_and_sender("launch", SENDER_TG_ID)
        .await
        .unwrap();
    let broadcast_leg = fx.db.messages.get_by_topic(topic.topic_id).await.unwrap()[0].clone();

    fx.relay
        .relay_reply(&broadcast_leg, "Quiet reply")
        .await
        .expect("Relay failed");

    assert!(fx.transport.calls().is_empty());

    let replies = fx
        .db
        .messages
        .get_replies_by_topic(topic.topic_id)
        .await
        .unwrap();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].is_undelivered());

    // An undelivered leg has no transport id, so it cannot be resolved as a
    // reply target.
    let resolved = fx.db.messages.get_by_tg_message_id(0).await.unwrap();
    assert!(resolved.is_none());
}

/// Seeds `count` recipient replies under a fresh topic and returns its id.
async fn seed_replies(fx: &Fixture, topic_name: &str, count: usize) -> i64 {
    let topic = fx
        .db
        .topics
        .get_or_create(SENDER_TG_ID, topic_name)
        .await
        .expect("Failed to create topic");

    let base = Utc::now();
    for i in 0..count {
        let recipient_id = if i % 2 == 0 { fx.alice_id } else { fx.bob_id };
        let record = MessageRecord::new(
            500 + i as i64,
            SENDER_TG_ID,
            recipient_id,
            topic.topic_id,
            fx.list_id,
            base + Duration::seconds(i as i64),
            format!("reply {}", i + 1),
            Direction::FromRecipient,
        );
        fx.db.messages.save(&record).await.expect("Failed to save");
    }

    topic.topic_id
}

fn nav_row(call: &Call) -> &PageControls {
    match call {
        Call::SendControls { controls, .. } | Call::EditControls { controls, .. } => controls,
        other => panic!("Expected a controls call, got {:?}", other),
    }
}

#[tokio::test]
async fn pagination_reuses_slots_and_blanks_leftovers() {
    let fx = setup().await;
    seed_replies(&fx, "launch", 7).await;

    let reply_index = ReplyIndex::new();
    let pager = ReplyPager::new(fx.transport.clone(), fx.db.clone(), reply_index, 5);
    let sessions = SessionRegistry::new();

    let token = derive_namespace(SENDER_TG_ID, "launch");
    let session = Arc::new(PagingSession::new(
        token.clone(),
        SENDER_TG_ID,
        SENDER_TG_ID,
        "launch".to_string(),
        String::new(),
    ));
    sessions.insert(session.clone()).await;

    pager.render(&session, 1).await.expect("Render failed");

    let calls = fx.transport.calls();
    // Five slot sends plus the keyboard message.
    assert_eq!(calls.len(), 6);
    for (i, call) in calls[..5].iter().enumerate() {
        match call {
            Call::Send { chat_id, text } => {
                assert_eq!(*chat_id, SENDER_TG_ID);
                assert!(text.contains(&format!("reply {}", i + 1)), "slot {}: {}", i, text);
            }
            other => panic!("Expected slot send, got {:?}", other),
        }
    }
    let controls = nav_row(&calls[5]);
    let row = &controls.rows[0];
    assert_eq!(row.len(), 5);
    assert_eq!(row[0].callback_data, None);
    assert_eq!(row[1].callback_data, None);
    assert_eq!(row[2].label, "· 1 ·");
    assert_eq!(row[3].callback_data, Some(format!("{token}_next:2")));
    assert_eq!(row[4].callback_data, Some(format!("{token}_last:2")));

    fx.transport.clear();
    pager.render(&session, 2).await.expect("Render failed");

    let calls = fx.transport.calls();
    // Two slots replaced, three blanked, keyboard edited in place.
    assert_eq!(calls.len(), 6);
    match &calls[0] {
        Call::Edit { text, .. } => assert!(text.contains("reply 6")),
        other => panic!("Expected edit, got {:?}", other),
    }
    match &calls[1] {
        Call::Edit { text, .. } => assert!(text.contains("reply 7")),
        other => panic!("Expected edit, got {:?}", other),
    }
    for call in &calls[2..5] {
        match call {
            Call::Edit { text, .. } => assert_eq!(text, BLANK_SLOT),
            other => panic!("Expected blanking edit, got {:?}", other),
        }
    }
    let controls = nav_row(&calls[5]);
    let row = &controls.rows[0];
    assert_eq!(row[0].callback_data, Some(format!("{token}_first:1")));
    assert_eq!(row[1].callback_data, Some(format!("{token}_prev:1")));
    assert_eq!(row[2].label, "· 2 ·");
    assert_eq!(row[3].callback_data, None);
    assert_eq!(row[4].callback_data, None);

    // Navigating back to page 1 must not re-send: all five slots exist and
    // get edited back, and the keyboard is edited again.
    fx.transport.clear();
    pager.render(&session, 1).await.expect("Render failed");
    let calls = fx.transport.calls();
    assert!(calls
        .iter()
        .all(|c| matches!(c, Call::Edit { .. } | Call::EditControls { .. })));
    assert_eq!(calls.len(), 6);
}

#[tokio::test]
async fn rendering_an_unchanged_page_skips_all_edits() {
    let fx = setup().await;
    seed_replies(&fx, "launch", 3).await;

    let pager = ReplyPager::new(fx.transport.clone(), fx.db.clone(), ReplyIndex::new(), 5);
    let session = Arc::new(PagingSession::new(
        derive_namespace(SENDER_TG_ID, "launch"),
        SENDER_TG_ID,
        SENDER_TG_ID,
        "launch".to_string(),
        String::new(),
    ));

    pager.render(&session, 1).await.expect("Render failed");
    fx.transport.clear();

    pager.render(&session, 1).await.expect("Render failed");
    let calls = fx.transport.calls();
    // Only the keyboard is refreshed; the slot texts did not change.
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], Call::EditControls { .. }));
}

#[tokio::test]
async fn search_filter_narrows_rendered_replies() {
    let fx = setup().await;
    seed_replies(&fx, "launch", 7).await;

    let pager = ReplyPager::new(fx.transport.clone(), fx.db.clone(), ReplyIndex::new(), 5);
    let session = Arc::new(PagingSession::new(
        derive_namespace(SENDER_TG_ID, "launch"),
        SENDER_TG_ID,
        SENDER_TG_ID,
        "launch".to_string(),
        "reply 7".to_string(),
    ));

    pager.render(&session, 1).await.expect("Render failed");

    let calls = fx.transport.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        Call::Send { text, .. } => assert!(text.contains("reply 7")),
        other => panic!("Expected slot send, got {:?}", other),
    }
    // Single page, so every navigation button is inert.
    let row = &nav_row(&calls[1]).rows[0];
    assert!(row.iter().all(|b| b.callback_data.is_none()));
}

#[tokio::test]
async fn sender_reply_to_rendered_slot_reaches_original_recipient() {
    let fx = setup().await;
    let topic_id = seed_replies(&fx, "launch", 2).await;

    let reply_index = ReplyIndex::new();
    let pager = ReplyPager::new(
        fx.transport.clone(),
        fx.db.clone(),
        reply_index.clone(),
        5,
    );
    let session = Arc::new(PagingSession::new(
        derive_namespace(SENDER_TG_ID, "launch"),
        SENDER_TG_ID,
        SENDER_TG_ID,
        "launch".to_string(),
        String::new(),
    ));
    pager.render(&session, 1).await.expect("Render failed");

    // The first rendered slot got the first deterministic transport id.
    let resolver = ThreadResolver::new(reply_index, fx.db.clone());
    let source = resolver.resolve(100).await.expect("Slot did not resolve");
    assert_eq!(source.direction, Direction::FromRecipient);
    assert_eq!(source.recipient_id, fx.alice_id);

    fx.transport.clear();
    fx.relay
        .relay_reply(&source, "Thanks for the feedback")
        .await
        .expect("Relay failed");

    assert_eq!(
        fx.transport.calls(),
        vec![Call::Send {
            chat_id: 11,
            text: "Thanks for the feedback".to_string()
        }]
    );

    let messages = fx.db.messages.get_by_topic(topic_id).await.unwrap();
    let outbound: Vec<_> = messages
        .iter()
        .filter(|m| m.direction == Direction::FromSender)
        .collect();
    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].recipient_id, fx.alice_id);
    assert_eq!(outbound[0].list_id, fx.list_id);
}
