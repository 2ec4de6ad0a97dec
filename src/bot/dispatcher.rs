use crate::bot::events::NotificationEvent;
use crate::bot::telegram::ChatTransport;
use crate::storage::{SubscriberId, SubscriptionRegistry};
use crate::utils::format_difficulty;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Outcome of one fan-out once every send has finished
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Sends launched for one event.
///
/// Each send runs on its own task. Dropping this value leaves them running;
/// `settle` waits for all of them.
#[derive(Debug, Default)]
pub struct Deliveries {
    handles: Vec<JoinHandle<bool>>,
}

impl Deliveries {
    pub fn none() -> Deliveries {
        Deliveries::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub async fn settle(self) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for handle in self.handles {
            match handle.await {
                Ok(true) => report.delivered += 1,
                Ok(false) => report.failed += 1,
                Err(e) => {
                    error!("Delivery task did not complete: {e}");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

pub fn block_found_message(height: u64, message: &str) -> String {
    format!("Block Found! Result: {message}, Height: {height}")
}

pub fn best_difficulty_message(difficulty: f64) -> String {
    format!("New Best Diff! Result: {}", format_difficulty(difficulty))
}

/// Fans an event out to every chat subscribed to its address
#[derive(Clone)]
pub struct NotificationDispatcher {
    transport: Arc<dyn ChatTransport>,
    registry: Arc<dyn SubscriptionRegistry>,
    best_diff_notifications: bool,
}

impl NotificationDispatcher {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        registry: Arc<dyn SubscriptionRegistry>,
        best_diff_notifications: bool,
    ) -> NotificationDispatcher {
        NotificationDispatcher {
            transport,
            registry,
            best_diff_notifications,
        }
    }

    pub async fn notify_block_found(
        &self,
        address: &str,
        height: u64,
        block_hash: Option<&str>,
        message: &str,
    ) -> Deliveries {
        info!(
            "Block found for {address} at height {height} ({})",
            block_hash.unwrap_or("unknown hash")
        );
        self.fan_out(address, block_found_message(height, message))
            .await
    }

    pub async fn notify_best_difficulty(&self, address: &str, difficulty: f64) -> Deliveries {
        if !self.best_diff_notifications {
            return Deliveries::none();
        }
        self.fan_out(address, best_difficulty_message(difficulty))
            .await
    }

    pub async fn dispatch(&self, event: &NotificationEvent) -> Deliveries {
        match event {
            NotificationEvent::BlockFound {
                address,
                height,
                block_hash,
                message,
            } => {
                self.notify_block_found(address, *height, block_hash.as_deref(), message)
                    .await
            }
            NotificationEvent::BestDifficulty {
                address,
                difficulty,
            } => self.notify_best_difficulty(address, *difficulty).await,
        }
    }

    async fn fan_out(&self, address: &str, text: String) -> Deliveries {
        let subscriptions = match self.registry.get_subscriptions(address).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                error!("Failed to look up subscribers for {address}: {e}");
                return Deliveries::none();
            }
        };
        if subscriptions.is_empty() {
            return Deliveries::none();
        }

        debug!(
            "Notifying {} subscriber(s) of {address}",
            subscriptions.len()
        );
        let text: Arc<str> = Arc::from(text);
        let handles = subscriptions
            .iter()
            .map(|subscription| {
                self.spawn_send(subscription.get_subscriber_id(), Arc::clone(&text))
            })
            .collect();
        Deliveries { handles }
    }

    fn spawn_send(&self, chat_id: SubscriberId, text: Arc<str>) -> JoinHandle<bool> {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            match transport.send_message(chat_id, &text).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to notify chat {chat_id}: {e}");
                    false
                }
            }
        })
    }
}
