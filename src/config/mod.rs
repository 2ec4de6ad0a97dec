//! Configuration management
//!
//! Settings come from an optional TOML file with environment variables
//! layered on top. A missing bot token disables the bot without an error.

pub mod settings;

pub use settings::{BotConfig, BotMode, Settings};
