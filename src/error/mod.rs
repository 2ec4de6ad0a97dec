//! Error handling for the notifier
//!
//! One error type covers storage, transport, configuration and encoding
//! failures so every layer can propagate with `?`.

use std::fmt;

/// Result type alias for notifier operations
pub type Result<T> = std::result::Result<T, NotifierError>;

/// Error types for subscription storage and notification delivery
#[derive(Debug, Clone)]
pub enum NotifierError {
    /// Subscription store errors
    Database(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// HTTP-level failures talking to the chat transport
    Transport(String),
    /// The chat API answered but rejected the request
    Api { code: Option<i64>, description: String },
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
    /// Invalid address format
    InvalidAddress(String),
}

impl fmt::Display for NotifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifierError::Database(msg) => write!(f, "Database error: {msg}"),
            NotifierError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            NotifierError::Transport(msg) => write!(f, "Transport error: {msg}"),
            NotifierError::Api {
                code: Some(code),
                description,
            } => write!(f, "Chat API error {code}: {description}"),
            NotifierError::Api {
                code: None,
                description,
            } => write!(f, "Chat API error: {description}"),
            NotifierError::Config(msg) => write!(f, "Configuration error: {msg}"),
            NotifierError::Io(msg) => write!(f, "I/O error: {msg}"),
            NotifierError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
        }
    }
}

impl std::error::Error for NotifierError {}

impl NotifierError {
    /// True for failures of the subscription store.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            NotifierError::Database(_) | NotifierError::Serialization(_)
        )
    }
}

impl From<std::io::Error> for NotifierError {
    fn from(err: std::io::Error) -> Self {
        NotifierError::Io(err.to_string())
    }
}

impl From<sled::Error> for NotifierError {
    fn from(err: sled::Error) -> Self {
        NotifierError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for NotifierError {
    fn from(err: bincode::error::EncodeError) -> Self {
        NotifierError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for NotifierError {
    fn from(err: bincode::error::DecodeError) -> Self {
        NotifierError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for NotifierError {
    fn from(err: reqwest::Error) -> Self {
        NotifierError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for NotifierError {
    fn from(err: serde_json::Error) -> Self {
        NotifierError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for NotifierError {
    fn from(err: toml::de::Error) -> Self {
        NotifierError::Config(err.to_string())
    }
}
