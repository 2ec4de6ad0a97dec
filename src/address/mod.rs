//! Bitcoin address validation
//!
//! Subscriptions are keyed by payout address, so every `/subscribe` is
//! checked here before anything touches the registry.

pub mod validator;

pub use validator::{parse_address, validate_address, AddressType, Network, ADDRESS_CHECK_SUM_LEN};
