//! Pagination engine for the reply-browsing view.
//!
//! Page math is pure and tested in isolation; [`ReplyPager`] renders a page
//! as a bounded set of slot messages that are edited in place on navigation
//! rather than re-sent, plus a five-button navigation row whose callback
//! payloads carry the session's namespace token.

use std::ops::Range;
use std::sync::Arc;

use storage::Database;
use tracing::{info, instrument};

use crate::core::{PageButton, PageControls, Result, Transport};
use crate::session::{PagingSession, ReplyIndex, RenderedSlot};

/// Production page size; kept configurable through [`ReplyPager::new`].
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Text a leftover slot is edited to when the new page is shorter than the
/// previous one. Slots are never deleted.
pub const BLANK_SLOT: &str = "-";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `ceil(count / page_size)`; 0 pages for an empty reply set.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size)
}

/// Clamps a requested page into `[1, total_pages]`; an empty view pins to
/// page 1 with no slots.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    if total_pages == 0 {
        1
    } else {
        requested.clamp(1, total_pages)
    }
}

/// Slot index range `[(page-1)*page_size, page*page_size)` clipped to count.
pub fn slot_range(page: usize, page_size: usize, count: usize) -> Range<usize> {
    let start = ((page - 1) * page_size).min(count);
    let end = (page * page_size).min(count);
    start..end
}

/// Builds the first/prev/current/next/last row for the given page. First and
/// prev go inert on page 1, next and last on the final page; the current
/// button is always inert. Active payloads are `{token}_{tag}:{page}`.
pub fn page_controls(token: &str, page: usize, total_pages: usize) -> PageControls {
    let mut buttons = Vec::with_capacity(5);

    if page <= 1 {
        buttons.push(PageButton::inert(BLANK_SLOT));
        buttons.push(PageButton::inert(BLANK_SLOT));
    } else {
        buttons.push(PageButton::active("« 1", format!("{token}_first:1")));
        buttons.push(PageButton::active(
            format!("< {}", page - 1),
            format!("{token}_prev:{}", page - 1),
        ));
    }

    buttons.push(PageButton::inert(format!("· {} ·", page)));

    if page >= total_pages {
        buttons.push(PageButton::inert(BLANK_SLOT));
        buttons.push(PageButton::inert(BLANK_SLOT));
    } else {
        buttons.push(PageButton::active(
            format!("{} >", page + 1),
            format!("{token}_next:{}", page + 1),
        ));
        buttons.push(PageButton::active(
            format!("{} »", total_pages),
            format!("{token}_last:{}", total_pages),
        ));
    }

    PageControls::single_row(buttons)
}

/// Renders paginated reply views into a chat, reusing slot messages across
/// navigations within one session.
#[derive(Clone)]
pub struct ReplyPager {
    transport: Arc<dyn Transport>,
    db: Database,
    reply_index: ReplyIndex,
    page_size: usize,
}

impl ReplyPager {
    pub fn new(
        transport: Arc<dyn Transport>,
        db: Database,
        reply_index: ReplyIndex,
        page_size: usize,
    ) -> Self {
        Self {
            transport,
            db,
            reply_index,
            page_size,
        }
    }

    /// Loads the topic's recipient replies and applies the session's literal
    /// substring filter in place.
    async fn load_replies(
        &self,
        session: &PagingSession,
    ) -> Result<Vec<storage::MessageRecord>> {
        let topic = self
            .db
            .topics
            .get_by_name_and_sender(&session.topic_name, session.owner_tg_id)
            .await?;
        let mut replies = self.db.messages.get_replies_by_topic(topic.topic_id).await?;

        if !session.search_filter.is_empty() {
            replies.retain(|m| m.body.contains(&session.search_filter));
        }

        Ok(replies)
    }

    /// Re-renders the session at the requested page (clamped). Slots already
    /// on screen are edited; missing ones are sent; leftovers from a longer
    /// previous page are blanked. Each populated slot is recorded in the
    /// reply index so direct replies to it resolve to its source message.
    /// A transport or storage failure aborts mid-render; committed edits
    /// stay as they are.
    #[instrument(skip(self, session), fields(token = %session.token))]
    pub async fn render(&self, session: &PagingSession, requested_page: usize) -> Result<()> {
        let replies = self.load_replies(session).await?;
        let total = total_pages(replies.len(), self.page_size);
        let page = clamp_page(requested_page, total);
        let range = slot_range(page, self.page_size, replies.len());

        let mut state = session.state().await;

        let mut populated = 0;
        for reply in &replies[range] {
            let recipient = self.db.recipients.get_by_id(reply.recipient_id).await?;
            let text = format!(
                "@{} ({}):\n\n{}",
                recipient.tg_username,
                reply.sent_at.format(TIME_FORMAT),
                reply.body
            );

            if let Some(slot) = state.slots.get_mut(populated) {
                if slot.text != text {
                    self.transport
                        .edit_text(session.chat_id, slot.message_id, &text)
                        .await?;
                    slot.text = text;
                }
            } else {
                let sent = self.transport.send_text(session.chat_id, &text).await?;
                state.slots.push(RenderedSlot {
                    message_id: sent.message_id,
                    text,
                });
            }

            self.reply_index
                .record(state.slots[populated].message_id, reply.clone())
                .await;
            populated += 1;
        }

        for slot in state.slots.iter_mut().skip(populated) {
            if slot.text != BLANK_SLOT {
                self.transport
                    .edit_text(session.chat_id, slot.message_id, BLANK_SLOT)
                    .await?;
                slot.text = BLANK_SLOT.to_string();
            }
        }

        let controls = page_controls(&session.token, page, total);
        match state.keyboard_message_id {
            Some(keyboard_id) => {
                self.transport
                    .edit_controls(session.chat_id, keyboard_id, &controls)
                    .await?;
            }
            None => {
                let text = format!(
                    "Replies for topic '{}'. Pick a page",
                    session.topic_name
                );
                let sent = self
                    .transport
                    .send_with_controls(session.chat_id, &text, &controls)
                    .await?;
                state.keyboard_message_id = Some(sent.message_id);
            }
        }

        state.page = page;
        state.total_pages = total;

        info!(page, total, populated, "Rendered reply page");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceil() {
        for page_size in 1..=7 {
            for count in 0..=40 {
                let expected = (count + page_size - 1) / page_size;
                assert_eq!(total_pages(count, page_size), expected);
            }
        }
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(7, 5), 2);
    }

    #[test]
    fn slot_counts_match_min_rule() {
        let page_size = 5;
        for count in 0..=23 {
            let total = total_pages(count, page_size);
            for page in 1..=total.max(1) {
                let range = slot_range(page, page_size, count);
                let expected = if page > total {
                    0
                } else {
                    page_size.min(count - (page - 1) * page_size)
                };
                assert_eq!(range.len(), expected, "count={} page={}", count, page);
            }
        }
    }

    #[test]
    fn page_clamps_never_error() {
        assert_eq!(clamp_page(99, 3), 3);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(7, 0), 1);

        // A clamped page never produces a negative or reversed range.
        let range = slot_range(clamp_page(99, 0), 5, 0);
        assert!(range.is_empty());
    }

    #[test]
    fn controls_on_first_of_two_pages() {
        let controls = page_controls("tok", 1, 2);
        let row = &controls.rows[0];
        let labels: Vec<_> = row.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["-", "-", "· 1 ·", "2 >", "2 »"]);

        assert!(row[0].callback_data.is_none());
        assert!(row[1].callback_data.is_none());
        assert!(row[2].callback_data.is_none());
        assert_eq!(row[3].callback_data.as_deref(), Some("tok_next:2"));
        assert_eq!(row[4].callback_data.as_deref(), Some("tok_last:2"));
    }

    #[test]
    fn controls_on_last_page() {
        let controls = page_controls("tok", 2, 2);
        let row = &controls.rows[0];
        assert_eq!(row[0].callback_data.as_deref(), Some("tok_first:1"));
        assert_eq!(row[1].callback_data.as_deref(), Some("tok_prev:1"));
        assert!(row[3].callback_data.is_none());
        assert!(row[4].callback_data.is_none());
    }

    #[test]
    fn controls_on_middle_page() {
        let controls = page_controls("tok", 2, 3);
        let labels: Vec<_> = controls.rows[0].iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["« 1", "< 1", "· 2 ·", "3 >", "3 »"]);
    }

    #[test]
    fn controls_on_empty_view() {
        let controls = page_controls("tok", 1, 0);
        assert!(controls.rows[0].iter().all(|b| b.callback_data.is_none()));
    }
}
