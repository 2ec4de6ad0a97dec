//! Subscription storage
//!
//! The registry trait the bot talks to, a durable sled implementation used
//! by the binary, and an in-memory implementation for tests.

pub mod memory_registry;
pub mod sled_registry;
pub mod subscriptions;

pub use memory_registry::InMemorySubscriptionRegistry;
pub use sled_registry::SledSubscriptionRegistry;
pub use subscriptions::{SubscribeOutcome, SubscriberId, Subscription, SubscriptionRegistry};
