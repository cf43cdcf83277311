//! Core domain + application logic for botdeck, a send-only Telegram chat
//! console.
//!
//! This crate is intentionally transport-agnostic. The Telegram Bot API lives
//! behind a port (trait) implemented in the adapter crate; the binary wires
//! the two together and renders snapshots.

pub mod config;
pub mod console;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod state;
pub mod store;

pub use errors::{Error, Result};
