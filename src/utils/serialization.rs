// Row encoding for the subscription store
use crate::error::{NotifierError, Result};
use serde::{Deserialize, Serialize};

/// Encode a stored row with bincode's standard configuration
pub fn serialize<T: Serialize + bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(data, config)
        .map_err(|e| NotifierError::Serialization(format!("Serialization failed: {e}")))
}

/// Decode a stored row; trailing bytes are an error since rows are written whole
pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de> + bincode::Decode<()>,
{
    let config = bincode::config::standard();
    let (data, read) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| NotifierError::Serialization(format!("Deserialization failed: {e}")))?;
    if read != bytes.len() {
        return Err(NotifierError::Serialization(format!(
            "Deserialization left {} trailing bytes",
            bytes.len() - read
        )));
    }
    Ok(data)
}
