use crate::error::{NotifierError, Result};
use crate::storage::SubscriberId;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Send/receive primitives the bot needs from a chat service
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, chat_id: SubscriberId, text: &str) -> Result<()>;

    /// Long-poll for updates with an id of at least `offset`.
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

impl IncomingMessage {
    pub fn new(chat_id: SubscriberId, text: &str) -> IncomingMessage {
        IncomingMessage {
            message_id: 0,
            chat: Chat { id: chat_id.0 },
            text: Some(text.to_string()),
        }
    }

    pub fn chat_id(&self) -> SubscriberId {
        SubscriberId(self.chat.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram Bot API client
pub struct TelegramClient {
    client: Client,
    base_url: String,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(client: Client, bot_token: impl Into<String>) -> Self {
        Self::with_base_url(client, TELEGRAM_API_URL, bot_token)
    }

    /// Point the client at a self-hosted Bot API server
    pub fn with_base_url(
        client: Client,
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.base_url, self.bot_token, method);

        // reqwest puts the url in its errors, and the url carries the token
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifierError::from(e.without_url()))?;

        // error statuses still come with a JSON body describing the failure
        let status = resp.status();
        let api: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| NotifierError::from(e.without_url()))?;

        if !api.ok {
            return Err(NotifierError::Api {
                code: api.error_code.or(Some(i64::from(status.as_u16()))),
                description: api
                    .description
                    .unwrap_or_else(|| format!("{method} failed")),
            });
        }
        api.result.ok_or_else(|| NotifierError::Api {
            code: None,
            description: format!("{method} returned no result"),
        })
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send_message(&self, chat_id: SubscriberId, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                json!({
                    "chat_id": chat_id.0,
                    "text": text,
                }),
            )
            .await?;
        Ok(())
    }

    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }
}
