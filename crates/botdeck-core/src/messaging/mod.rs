//! Messaging abstractions (Telegram Bot API today).

pub mod port;
