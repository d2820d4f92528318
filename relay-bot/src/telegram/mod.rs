//! Telegram framework layer: transport adapter and command surface.

mod adapter;
mod commands;

pub use adapter::{to_inline_keyboard, TelegramTransport, NOOP_CALLBACK};
pub use commands::{
    parse_broadcast, parse_create_list, parse_show_replies, BroadcastArgs, Command,
    CreateListArgs, ShowRepliesArgs,
};
