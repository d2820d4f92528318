//! Update handlers wired into the teloxide dispatcher: commands, plain-text
//! replies, and the static callback dispatcher.

pub mod callback;
pub mod commands;
pub mod reply;

pub use callback::{handle_callback, parse_callback, CallbackAction};
pub use commands::handle_command;
pub use reply::handle_text;
