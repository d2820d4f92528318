//! # Relay bot
//!
//! Telegram bot that broadcasts messages to mailing lists under named topics
//! and relays replies in both directions within each thread. Senders browse
//! recipient replies through an in-place paginated view driven by inline
//! keyboards. Storage lives in the companion `storage` crate.

pub mod cli;
pub mod config;
pub mod core;
pub mod handlers;
pub mod namespace;
pub mod pagination;
pub mod relay;
pub mod resolve;
pub mod runner;
pub mod session;
pub mod telegram;

pub use cli::{load_config, Cli, Commands};
pub use config::BotConfig;
pub use crate::core::{init_tracing, BotError, PageButton, PageControls, SentMessage, Transport};
pub use namespace::derive_namespace;
pub use pagination::{page_controls, ReplyPager, BLANK_SLOT, DEFAULT_PAGE_SIZE};
pub use relay::RelayDispatcher;
pub use resolve::ThreadResolver;
pub use runner::{run_bot, AppContext, HandlerResult};
pub use session::{PagingSession, ReplyIndex, SessionRegistry};
pub use telegram::{Command, TelegramTransport};
