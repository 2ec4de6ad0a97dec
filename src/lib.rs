//! # Pool Notifier - Telegram alerts for mining pool payout addresses
//!
//! Miners subscribe a chat to their payout address with `/subscribe
//! <address>`; the pool backend then reports "block found" and "new best
//! difficulty" events and every chat subscribed to that address gets a
//! message.
//!
//! ## How the code is organized
//! - `address/`: bitcoin address validation (base58check and segwit)
//! - `storage/`: the subscription registry, on sled or in memory
//! - `bot/`: command routing, notification fan-out, the Telegram transport
//! - `config/`: settings from a TOML file and environment variables
//! - `utils/`: hashing, row encoding, difficulty formatting
//! - `cli/`: command-line interface for running the bot and one-off tasks
//!
//! ## Things to keep in mind
//! - No bot token means the bot is disabled, and every entry point quietly
//!   does nothing.
//! - Deliveries are best effort: each send runs on its own task and a failed
//!   send never affects the others or the caller.
//! - `/subscribe` only admits the first chat for an address; later chats are
//!   told they are already subscribed.

pub mod address;
pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;
pub mod utils;

pub use address::{parse_address, validate_address, AddressType, Network};
pub use bot::{
    forward_json_lines, BotCommand, ChatTransport, CommandRouter, Deliveries, DeliveryReport,
    IncomingMessage, NotificationDispatcher, NotificationEvent, NotificationHandle,
    TelegramClient, TelegramService, Update,
};
pub use cli::{Command, Opt};
pub use config::{BotConfig, BotMode, Settings};
pub use error::{NotifierError, Result};
pub use storage::{
    InMemorySubscriptionRegistry, SledSubscriptionRegistry, SubscribeOutcome, SubscriberId,
    Subscription, SubscriptionRegistry,
};
pub use utils::format_difficulty;
