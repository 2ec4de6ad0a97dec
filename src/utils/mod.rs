//! Utility functions and helpers
//!
//! Hashing and base58 helpers used by address validation, row encoding for
//! the subscription store, and difficulty formatting.

pub mod crypto;
pub mod format;
pub mod serialization;

pub use crypto::{base58_decode, base58_encode, current_timestamp, double_sha256, sha256_digest};
pub use format::format_difficulty;
pub use serialization::{deserialize, serialize};
