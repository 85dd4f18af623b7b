//! Expense Bot — Telegram webhook expense tracker core.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod pipeline;
pub mod server;
pub mod telegram;
