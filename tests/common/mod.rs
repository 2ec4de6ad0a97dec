//! Shared fixtures for the integration tests

use async_trait::async_trait;
use pool_notifier::{ChatTransport, NotifierError, Result, SubscriberId, Update};
use std::collections::HashSet;
use std::sync::Mutex;
use tokio::sync::Semaphore;

pub const ADDRESS: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
pub const OTHER_ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

/// Transport double that records sends, rejects chosen chats and can hold
/// every send until the test releases it
pub struct MockTransport {
    sent: Mutex<Vec<(SubscriberId, String)>>,
    failing: HashSet<SubscriberId>,
    gate: Option<Semaphore>,
}

impl MockTransport {
    pub fn new() -> MockTransport {
        MockTransport {
            sent: Mutex::new(vec![]),
            failing: HashSet::new(),
            gate: None,
        }
    }

    pub fn failing_for(ids: &[SubscriberId]) -> MockTransport {
        MockTransport {
            failing: ids.iter().copied().collect(),
            ..MockTransport::new()
        }
    }

    /// Sends block until `release` is called
    pub fn gated() -> MockTransport {
        MockTransport {
            gate: Some(Semaphore::new(0)),
            ..MockTransport::new()
        }
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn sent(&self) -> Vec<(SubscriberId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, id: SubscriberId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| *to == id)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send_message(&self, chat_id: SubscriberId, text: &str) -> Result<()> {
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| NotifierError::Transport(e.to_string()))?;
            permit.forget();
        }
        if self.failing.contains(&chat_id) {
            return Err(NotifierError::Api {
                code: Some(403),
                description: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn get_updates(&self, _offset: i64, _timeout_secs: u64) -> Result<Vec<Update>> {
        Ok(vec![])
    }
}
