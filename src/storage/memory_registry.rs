use crate::error::{NotifierError, Result};
use crate::storage::{SubscribeOutcome, SubscriberId, Subscription, SubscriptionRegistry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// ( K -> address, V => subscriptions for that address )
///
/// Non-durable registry for tests and for running without a database.
#[derive(Default)]
pub struct InMemorySubscriptionRegistry {
    inner: RwLock<HashMap<String, Vec<Subscription>>>,
}

impl InMemorySubscriptionRegistry {
    pub fn new() -> InMemorySubscriptionRegistry {
        InMemorySubscriptionRegistry {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Total number of stored rows across all addresses
    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(map) => map.values().map(Vec::len).sum(),
            Err(_) => {
                log::error!("Failed to acquire read lock on subscription registry");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_locked(
        map: &mut HashMap<String, Vec<Subscription>>,
        subscriber_id: SubscriberId,
        address: &str,
    ) -> Result<()> {
        let rows = map.entry(address.to_string()).or_default();
        if rows
            .iter()
            .any(|row| row.get_subscriber_id() == subscriber_id)
        {
            return Ok(());
        }
        rows.push(Subscription::new(subscriber_id, address)?);
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRegistry for InMemorySubscriptionRegistry {
    async fn get_subscriptions(&self, address: &str) -> Result<Vec<Subscription>> {
        let map = self.inner.read().map_err(|e| {
            NotifierError::Database(format!("Failed to acquire registry read lock: {e}"))
        })?;
        Ok(map.get(address).cloned().unwrap_or_default())
    }

    async fn save_subscription(&self, subscriber_id: SubscriberId, address: &str) -> Result<()> {
        let mut map = self.inner.write().map_err(|e| {
            NotifierError::Database(format!("Failed to acquire registry write lock: {e}"))
        })?;
        Self::insert_locked(&mut map, subscriber_id, address)
    }

    async fn subscribe_if_unclaimed(
        &self,
        subscriber_id: SubscriberId,
        address: &str,
    ) -> Result<SubscribeOutcome> {
        // the write lock spans both the check and the insert
        let mut map = self.inner.write().map_err(|e| {
            NotifierError::Database(format!("Failed to acquire registry write lock: {e}"))
        })?;
        if map.get(address).is_some_and(|rows| !rows.is_empty()) {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }
        Self::insert_locked(&mut map, subscriber_id, address)?;
        Ok(SubscribeOutcome::Subscribed)
    }
}
