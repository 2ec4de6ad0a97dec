use crate::bot::dispatcher::{Deliveries, NotificationDispatcher};
use crate::bot::events::NotificationEvent;
use crate::bot::router::CommandRouter;
use crate::bot::telegram::{ChatTransport, IncomingMessage, TelegramClient};
use crate::config::{BotConfig, BotMode};
use crate::error::Result;
use crate::storage::SubscriptionRegistry;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// The bot as seen by the rest of the process.
///
/// Every public operation is a no-op when the bot is disabled.
#[derive(Clone)]
pub enum TelegramService {
    Disabled,
    Enabled(Arc<EnabledBot>),
}

pub struct EnabledBot {
    transport: Arc<dyn ChatTransport>,
    router: CommandRouter,
    dispatcher: NotificationDispatcher,
    poll_timeout_secs: u64,
}

impl TelegramService {
    /// Build the service for `mode`, talking to the real Telegram API.
    pub fn from_mode(mode: BotMode, registry: Arc<dyn SubscriptionRegistry>) -> Result<Self> {
        match mode {
            BotMode::Disabled => {
                info!("No Telegram bot token configured, notifications disabled");
                Ok(TelegramService::Disabled)
            }
            BotMode::Enabled(config) => {
                let client = reqwest::Client::builder().build()?;
                let transport = Arc::new(TelegramClient::new(client, config.token.as_str()));
                info!("Telegram bot init");
                Ok(Self::with_transport(&config, transport, registry))
            }
        }
    }

    pub fn with_transport(
        config: &BotConfig,
        transport: Arc<dyn ChatTransport>,
        registry: Arc<dyn SubscriptionRegistry>,
    ) -> Self {
        TelegramService::Enabled(Arc::new(EnabledBot {
            transport: Arc::clone(&transport),
            router: CommandRouter::new(Arc::clone(&registry)),
            dispatcher: NotificationDispatcher::new(
                transport,
                registry,
                config.best_diff_notifications,
            ),
            poll_timeout_secs: config.poll_timeout_secs,
        }))
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, TelegramService::Enabled(_))
    }

    /// Route one inbound message and send the reply, if any.
    pub async fn handle_message(&self, message: &IncomingMessage) {
        let TelegramService::Enabled(bot) = self else {
            return;
        };
        debug!("Inbound message: {message:?}");

        let Some(text) = message.text.as_deref() else {
            return;
        };
        let chat_id = message.chat_id();
        if let Some(reply) = bot.router.route(chat_id, text).await {
            if let Err(e) = bot.transport.send_message(chat_id, &reply).await {
                warn!("Failed to reply to chat {chat_id}: {e}");
            }
        }
    }

    pub async fn notify_block_found(
        &self,
        address: &str,
        height: u64,
        block_hash: Option<&str>,
        message: &str,
    ) -> Deliveries {
        match self {
            TelegramService::Disabled => Deliveries::none(),
            TelegramService::Enabled(bot) => {
                bot.dispatcher
                    .notify_block_found(address, height, block_hash, message)
                    .await
            }
        }
    }

    pub async fn notify_best_difficulty(&self, address: &str, difficulty: f64) -> Deliveries {
        match self {
            TelegramService::Disabled => Deliveries::none(),
            TelegramService::Enabled(bot) => {
                bot.dispatcher
                    .notify_best_difficulty(address, difficulty)
                    .await
            }
        }
    }

    pub async fn dispatch(&self, event: &NotificationEvent) -> Deliveries {
        match self {
            TelegramService::Disabled => Deliveries::none(),
            TelegramService::Enabled(bot) => bot.dispatcher.dispatch(event).await,
        }
    }

    /// Long-poll Telegram for commands until `shutdown` flips or its sender goes away.
    pub async fn run_polling(&self, mut shutdown: watch::Receiver<bool>) {
        let TelegramService::Enabled(bot) = self else {
            return;
        };
        info!("Telegram bot polling started");

        let mut offset = 0;
        while !*shutdown.borrow() {
            let result = tokio::select! {
                _ = shutdown.changed() => break,
                result = bot.transport.get_updates(offset, bot.poll_timeout_secs) => result,
            };

            match result {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        if let Some(message) = update.message {
                            let service = self.clone();
                            tokio::spawn(async move {
                                service.handle_message(&message).await;
                            });
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch Telegram updates: {e}");
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                    }
                }
            }
        }
        info!("Telegram bot polling stopped");
    }

    /// Dispatch queued events until every `NotificationHandle` is dropped.
    ///
    /// Each event is handled on its own task so a slow registry lookup does
    /// not hold up the queue.
    pub async fn run_events(&self, mut receiver: mpsc::Receiver<NotificationEvent>) {
        while let Some(event) = receiver.recv().await {
            if !self.is_enabled() {
                continue;
            }
            let service = self.clone();
            tokio::spawn(async move {
                // dropping the deliveries leaves the sends running
                let _ = service.dispatch(&event).await;
            });
        }
    }
}
