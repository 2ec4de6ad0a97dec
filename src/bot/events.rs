use crate::error::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Domain events produced by the mining backend.
///
/// One JSON object per event, tagged by `type`:
/// `{"type":"block_found","address":"...","height":840000,"message":"accepted"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    BlockFound {
        address: String,
        height: u64,
        #[serde(default)]
        block_hash: Option<String>,
        message: String,
    },
    BestDifficulty {
        address: String,
        difficulty: f64,
    },
}

impl NotificationEvent {
    pub fn address(&self) -> &str {
        match self {
            NotificationEvent::BlockFound { address, .. } => address,
            NotificationEvent::BestDifficulty { address, .. } => address,
        }
    }
}

/// Cloneable entry point for event producers (fire-and-forget)
#[derive(Clone)]
pub struct NotificationHandle {
    sender: mpsc::Sender<NotificationEvent>,
}

impl NotificationHandle {
    pub fn channel(capacity: usize) -> (NotificationHandle, mpsc::Receiver<NotificationEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (NotificationHandle { sender }, receiver)
    }

    /// Queue an event without waiting. Returns false if it was dropped.
    ///
    /// Usable from synchronous code; events are never retried.
    pub fn notify(&self, event: NotificationEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(
                    "Notification queue full, dropping event for {}",
                    event.address()
                );
                false
            }
            Err(TrySendError::Closed(event)) => {
                warn!(
                    "Notification service stopped, dropping event for {}",
                    event.address()
                );
                false
            }
        }
    }

    pub fn notify_block_found(
        &self,
        address: impl Into<String>,
        height: u64,
        block_hash: Option<String>,
        message: impl Into<String>,
    ) -> bool {
        self.notify(NotificationEvent::BlockFound {
            address: address.into(),
            height,
            block_hash,
            message: message.into(),
        })
    }

    pub fn notify_best_difficulty(&self, address: impl Into<String>, difficulty: f64) -> bool {
        self.notify(NotificationEvent::BestDifficulty {
            address: address.into(),
            difficulty,
        })
    }
}

/// Read JSON-lines events from `reader` and queue them on `handle` until EOF.
///
/// Malformed lines are logged and skipped. Returns the number of lines queued.
pub async fn forward_json_lines<R>(reader: R, handle: &NotificationHandle) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<NotificationEvent>(line) {
            Ok(event) => {
                debug!("Received {event:?}");
                if handle.notify(event) {
                    forwarded += 1;
                }
            }
            Err(e) => warn!("Skipping malformed event line: {e}"),
        }
    }
    Ok(forwarded)
}
