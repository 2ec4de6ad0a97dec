//! Test doubles for the chat transport and the registry

use crate::bot::telegram::{ChatTransport, Update};
use crate::error::{NotifierError, Result};
use crate::storage::{SubscriberId, Subscription, SubscriptionRegistry};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Records every message it is asked to send and fails for chosen chats
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(SubscriberId, String)>>,
    failing: HashSet<SubscriberId>,
}

impl RecordingTransport {
    pub fn failing_for(ids: &[SubscriberId]) -> RecordingTransport {
        RecordingTransport {
            sent: Mutex::new(vec![]),
            failing: ids.iter().copied().collect(),
        }
    }

    pub fn sent(&self) -> Vec<(SubscriberId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(&self, chat_id: SubscriberId, text: &str) -> Result<()> {
        if self.failing.contains(&chat_id) {
            return Err(NotifierError::Api {
                code: Some(400),
                description: "Bad Request: chat not found".to_string(),
            });
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn get_updates(&self, _offset: i64, _timeout_secs: u64) -> Result<Vec<Update>> {
        Ok(vec![])
    }
}

/// Hands out queued update batches, then blocks like an idle long poll
#[derive(Default)]
pub struct ScriptedTransport {
    batches: Mutex<VecDeque<Vec<Update>>>,
    offsets: Mutex<Vec<i64>>,
    sent: Mutex<Vec<(SubscriberId, String)>>,
    idle: Notify,
}

impl ScriptedTransport {
    pub fn with_batches(batches: Vec<Vec<Update>>) -> ScriptedTransport {
        ScriptedTransport {
            batches: Mutex::new(batches.into()),
            ..ScriptedTransport::default()
        }
    }

    /// Resolves once a poll finds the script exhausted
    pub async fn wait_idle(&self) {
        self.idle.notified().await;
    }

    pub fn offsets(&self) -> Vec<i64> {
        self.offsets.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(SubscriberId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send_message(&self, chat_id: SubscriberId, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn get_updates(&self, offset: i64, _timeout_secs: u64) -> Result<Vec<Update>> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => Ok(batch),
            None => {
                self.idle.notify_one();
                std::future::pending().await
            }
        }
    }
}

/// Registry whose store is unreachable
pub struct UnavailableRegistry;

#[async_trait]
impl SubscriptionRegistry for UnavailableRegistry {
    async fn get_subscriptions(&self, _address: &str) -> Result<Vec<Subscription>> {
        Err(NotifierError::Database("connection refused".to_string()))
    }

    async fn save_subscription(&self, _subscriber_id: SubscriberId, _address: &str) -> Result<()> {
        Err(NotifierError::Database("connection refused".to_string()))
    }
}
