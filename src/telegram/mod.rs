//! Telegram Bot API integration — inbound update schema and the outbound
//! client.

pub mod api;
pub mod update;

pub use api::{FileFetcher, Notifier, TelegramApi};
pub use update::TelegramUpdate;
