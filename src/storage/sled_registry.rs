use crate::error::{NotifierError, Result};
use crate::storage::{SubscribeOutcome, SubscriberId, Subscription, SubscriptionRegistry};
use crate::utils::{deserialize, serialize};
use async_trait::async_trait;
use log::info;
use sled::transaction::{TransactionError, TransactionResult, Transactional};
use sled::{Db, Tree};
use std::path::Path;

// Rows keyed by address + 0x00 + big-endian chat id
const SUBSCRIPTIONS_TREE: &str = "telegram_subscriptions";
// address -> first subscriber, the marker the atomic subscribe claims
const CLAIMED_ADDRESSES_TREE: &str = "claimed_addresses";

const KEY_SEPARATOR: u8 = 0x00;

/// Durable subscription registry on an embedded sled database
#[derive(Clone)]
pub struct SledSubscriptionRegistry {
    db: Db,
    subscriptions: Tree,
    claimed: Tree,
}

impl SledSubscriptionRegistry {
    pub fn open(path: impl AsRef<Path>) -> Result<SledSubscriptionRegistry> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            NotifierError::Database(format!("Failed to open database at {path:?}: {e}"))
        })?;
        info!("Opened subscription database at {path:?}");
        Self::from_db(db)
    }

    pub fn from_db(db: Db) -> Result<SledSubscriptionRegistry> {
        let subscriptions = db.open_tree(SUBSCRIPTIONS_TREE).map_err(|e| {
            NotifierError::Database(format!("Failed to open subscriptions tree: {e}"))
        })?;
        let claimed = db.open_tree(CLAIMED_ADDRESSES_TREE).map_err(|e| {
            NotifierError::Database(format!("Failed to open claimed addresses tree: {e}"))
        })?;
        Ok(SledSubscriptionRegistry {
            db,
            subscriptions,
            claimed,
        })
    }

    fn address_prefix(address: &str) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(address.len() + 1);
        prefix.extend_from_slice(address.as_bytes());
        prefix.push(KEY_SEPARATOR);
        prefix
    }

    fn row_key(address: &str, subscriber_id: SubscriberId) -> Vec<u8> {
        let mut key = Self::address_prefix(address);
        key.extend_from_slice(&subscriber_id.0.to_be_bytes());
        key
    }

    async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| NotifierError::Database(format!("Failed to flush database: {e}")))?;
        Ok(())
    }
}

fn transaction_error(err: TransactionError<()>) -> NotifierError {
    match err {
        TransactionError::Abort(()) => {
            NotifierError::Database("Subscription transaction aborted".to_string())
        }
        TransactionError::Storage(e) => {
            NotifierError::Database(format!("Subscription transaction failed: {e}"))
        }
    }
}

#[async_trait]
impl SubscriptionRegistry for SledSubscriptionRegistry {
    async fn get_subscriptions(&self, address: &str) -> Result<Vec<Subscription>> {
        let mut subscriptions = vec![];
        for item in self.subscriptions.scan_prefix(Self::address_prefix(address)) {
            let (_, v) = item.map_err(|e| {
                NotifierError::Database(format!("Failed to iterate subscriptions: {e}"))
            })?;
            let subscription: Subscription = deserialize(v.as_ref())?;
            subscriptions.push(subscription);
        }
        Ok(subscriptions)
    }

    async fn save_subscription(&self, subscriber_id: SubscriberId, address: &str) -> Result<()> {
        let key = Self::row_key(address, subscriber_id);
        let value = serialize(&Subscription::new(subscriber_id, address)?)?;
        let marker = subscriber_id.0.to_be_bytes();

        let result: TransactionResult<(), ()> = (&self.subscriptions, &self.claimed)
            .transaction(|(subscriptions, claimed)| {
                if subscriptions.get(key.as_slice())?.is_none() {
                    subscriptions.insert(key.as_slice(), value.as_slice())?;
                }
                if claimed.get(address.as_bytes())?.is_none() {
                    claimed.insert(address.as_bytes(), &marker[..])?;
                }
                Ok(())
            });
        result.map_err(transaction_error)?;
        self.flush().await
    }

    async fn subscribe_if_unclaimed(
        &self,
        subscriber_id: SubscriberId,
        address: &str,
    ) -> Result<SubscribeOutcome> {
        let key = Self::row_key(address, subscriber_id);
        let value = serialize(&Subscription::new(subscriber_id, address)?)?;
        let marker = subscriber_id.0.to_be_bytes();

        // sled transactions are serializable: two racing subscribers for the
        // same address conflict on the claim marker and one of them retries
        let result: TransactionResult<SubscribeOutcome, ()> = (&self.subscriptions, &self.claimed)
            .transaction(|(subscriptions, claimed)| {
                if claimed.get(address.as_bytes())?.is_some() {
                    return Ok(SubscribeOutcome::AlreadySubscribed);
                }
                claimed.insert(address.as_bytes(), &marker[..])?;
                subscriptions.insert(key.as_slice(), value.as_slice())?;
                Ok(SubscribeOutcome::Subscribed)
            });
        let outcome = result.map_err(transaction_error)?;

        if outcome == SubscribeOutcome::Subscribed {
            self.flush().await?;
        }
        Ok(outcome)
    }
}
