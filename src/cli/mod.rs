//! Command-line interface
//!
//! Runs the bot, triggers one-off notifications, and inspects the
//! subscription database.

pub mod commands;

pub use commands::{Command, Opt};
