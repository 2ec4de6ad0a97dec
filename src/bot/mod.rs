//! The Telegram bot
//!
//! Inbound commands go through the `router`, outbound notifications through
//! the `dispatcher`; `service` ties both to a transport and owns the
//! enabled/disabled switch.

pub mod dispatcher;
pub mod events;
pub mod router;
pub mod service;
pub mod telegram;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{Deliveries, DeliveryReport, NotificationDispatcher};
pub use events::{forward_json_lines, NotificationEvent, NotificationHandle, DEFAULT_EVENT_CAPACITY};
pub use router::{BotCommand, CommandRouter};
pub use service::TelegramService;
pub use telegram::{ChatTransport, IncomingMessage, TelegramClient, Update};
