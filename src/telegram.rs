//! Telegram Bot API integration
//!
//! Wire types for inbound updates and a reqwest client implementing the
//! chat-platform side of a turn.

mod client;
mod error;
mod types;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use types::*;
