use ring::digest::{Context, SHA256};

use crate::error::{NotifierError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch
pub fn current_timestamp() -> Result<i64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| NotifierError::Config(format!("System time error: {e}")))?
        .as_millis();

    i64::try_from(duration).map_err(|_| NotifierError::Config("Timestamp overflow".to_string()))
}

pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

/// SHA-256 applied twice, as used by base58check checksums
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256_digest(sha256_digest(data).as_slice())
}

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| NotifierError::InvalidAddress(format!("Invalid base58 encoding: {e}")))
}
