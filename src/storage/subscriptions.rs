use crate::error::{NotifierError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque chat identity that outbound messages are addressed to.
///
/// For Telegram this is the chat id; group chats are negative.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    bincode::Encode,
    bincode::Decode,
)]
#[serde(transparent)]
pub struct SubscriberId(pub i64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One chat identity's interest in one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Subscription {
    address: String,
    subscriber_id: SubscriberId,
    created_at: i64,
}

impl Subscription {
    pub fn new(subscriber_id: SubscriberId, address: &str) -> Result<Subscription> {
        Self::stamped(subscriber_id, address, crate::utils::current_timestamp())
    }

    // A row that cannot be stamped is a failed save
    fn stamped(
        subscriber_id: SubscriberId,
        address: &str,
        created_at: Result<i64>,
    ) -> Result<Subscription> {
        let created_at = created_at.map_err(|e| {
            NotifierError::Database(format!("Failed to timestamp subscription: {e}"))
        })?;
        Ok(Subscription {
            address: address.to_string(),
            subscriber_id,
            created_at,
        })
    }

    pub fn get_address(&self) -> &str {
        self.address.as_str()
    }

    pub fn get_subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }

    pub fn get_created_at(&self) -> i64 {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

/// Address -> subscribers mapping behind the bot.
///
/// At most one row exists per (address, subscriber) pair.
#[async_trait]
pub trait SubscriptionRegistry: Send + Sync {
    /// All subscriptions for `address`; empty when there are none.
    async fn get_subscriptions(&self, address: &str) -> Result<Vec<Subscription>>;

    /// Record `subscriber_id` for `address`. Saving an existing pair is a no-op.
    async fn save_subscription(&self, subscriber_id: SubscriberId, address: &str) -> Result<()>;

    /// Save the pair only if `address` has no subscribers yet.
    ///
    /// Implementations backed by shared storage must override this so the
    /// lookup and the insert happen atomically.
    async fn subscribe_if_unclaimed(
        &self,
        subscriber_id: SubscriberId,
        address: &str,
    ) -> Result<SubscribeOutcome> {
        if !self.get_subscriptions(address).await?.is_empty() {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }
        self.save_subscription(subscriber_id, address).await?;
        Ok(SubscribeOutcome::Subscribed)
    }
}
