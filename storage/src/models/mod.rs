//! Persistence models shared by the repositories.

mod mailing_list;
mod message;
mod recipient;
mod topic;
mod topic_stats;

pub use mailing_list::MailingList;
pub use message::{Direction, MessageRecord, UNDELIVERED_TG_MESSAGE_ID};
pub use recipient::Recipient;
pub use topic::Topic;
pub use topic_stats::TopicStats;
