//! Core types and traits: errors, transport abstraction, tracing init.

pub mod error;
pub mod logger;
pub mod transport;

pub use error::{BotError, Result};
pub use logger::init_tracing;
pub use transport::{PageButton, PageControls, SentMessage, Transport};

#[cfg(test)]
pub use transport::MockTransport;
