use crate::address::validate_address;
use crate::storage::{SubscribeOutcome, SubscriberId, SubscriptionRegistry};
use log::{debug, error, info};
use std::sync::Arc;

pub const WELCOME_REPLY: &str =
    "Welcome to the public-pool bot. /subscribe <address> to get notified.";
pub const INVALID_ADDRESS_REPLY: &str = "Invalid address.";
pub const SUBSCRIBED_REPLY: &str = "Subscribed!";
pub const ALREADY_SUBSCRIBED_REPLY: &str = "Already Subscribed!";
pub const FAILURE_REPLY: &str = "Something went wrong, please try again later.";

const START_KEYWORD: &str = "/start";
const SUBSCRIBE_KEYWORD: &str = "/subscribe";
const SUBSCRIBE_PREFIX: &str = "/subscribe ";

/// Commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand<'a> {
    Start,
    /// The address is everything after `/subscribe `, untrimmed
    Subscribe { address: &'a str },
}

impl<'a> BotCommand<'a> {
    pub fn parse(text: &'a str) -> Option<BotCommand<'a>> {
        if keyword_matches(text, SUBSCRIBE_KEYWORD) {
            let address = text.strip_prefix(SUBSCRIBE_PREFIX).unwrap_or("");
            return Some(BotCommand::Subscribe { address });
        }
        if keyword_matches(text, START_KEYWORD) {
            return Some(BotCommand::Start);
        }
        None
    }
}

// The keyword must end the text or be followed by whitespace or a @botname suffix
fn keyword_matches(text: &str, keyword: &str) -> bool {
    match text.strip_prefix(keyword) {
        Some(rest) => match rest.chars().next() {
            None => true,
            Some(c) => c.is_whitespace() || c == '@',
        },
        None => false,
    }
}

/// Turns inbound chat text into replies, touching the registry for `/subscribe`
#[derive(Clone)]
pub struct CommandRouter {
    registry: Arc<dyn SubscriptionRegistry>,
}

impl CommandRouter {
    pub fn new(registry: Arc<dyn SubscriptionRegistry>) -> CommandRouter {
        CommandRouter { registry }
    }

    /// The reply for `text` sent by `subscriber_id`, or `None` if it is not a command.
    pub async fn route(&self, subscriber_id: SubscriberId, text: &str) -> Option<String> {
        match BotCommand::parse(text) {
            Some(BotCommand::Start) => Some(WELCOME_REPLY.to_string()),
            Some(BotCommand::Subscribe { address }) => {
                Some(self.subscribe(subscriber_id, address).await.to_string())
            }
            None => {
                debug!("Ignoring non-command message from {subscriber_id}");
                None
            }
        }
    }

    async fn subscribe(&self, subscriber_id: SubscriberId, address: &str) -> &'static str {
        if !validate_address(address) {
            return INVALID_ADDRESS_REPLY;
        }

        // "already subscribed" means the address has any subscriber at all,
        // not necessarily this chat
        match self
            .registry
            .subscribe_if_unclaimed(subscriber_id, address)
            .await
        {
            Ok(SubscribeOutcome::Subscribed) => {
                info!("Chat {subscriber_id} subscribed to {address}");
                SUBSCRIBED_REPLY
            }
            Ok(SubscribeOutcome::AlreadySubscribed) => ALREADY_SUBSCRIBED_REPLY,
            Err(e) => {
                error!("Failed to subscribe chat {subscriber_id} to {address}: {e}");
                FAILURE_REPLY
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::testing::UnavailableRegistry;
    use crate::storage::InMemorySubscriptionRegistry;

    const ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

    #[test]
    fn test_parse_commands() {
        assert_eq!(BotCommand::parse("/start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/start@pool_bot"), Some(BotCommand::Start));
        assert_eq!(
            BotCommand::parse("/subscribe 1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"),
            Some(BotCommand::Subscribe { address: ADDRESS })
        );
        assert_eq!(BotCommand::parse("hello"), None);
        assert_eq!(BotCommand::parse("/Start"), None);
        assert_eq!(BotCommand::parse("/startled"), None);
        assert_eq!(BotCommand::parse("please /start"), None);
    }

    #[test]
    fn test_subscribe_remainder_is_verbatim() {
        assert_eq!(
            BotCommand::parse("/subscribe  1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa "),
            Some(BotCommand::Subscribe {
                address: " 1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa "
            })
        );
    }

    #[test]
    fn test_subscribe_without_address_is_empty() {
        assert_eq!(
            BotCommand::parse("/subscribe"),
            Some(BotCommand::Subscribe { address: "" })
        );
        assert_eq!(
            BotCommand::parse("/subscribe\n"),
            Some(BotCommand::Subscribe { address: "" })
        );
    }

    #[tokio::test]
    async fn test_start_replies_with_welcome() {
        let router = CommandRouter::new(Arc::new(InMemorySubscriptionRegistry::new()));
        let reply = router.route(SubscriberId(1), "/start").await;
        assert_eq!(reply.as_deref(), Some(WELCOME_REPLY));
    }

    #[tokio::test]
    async fn test_missing_address_is_invalid() {
        let registry = Arc::new(InMemorySubscriptionRegistry::new());
        let router = CommandRouter::new(registry.clone());
        let reply = router.route(SubscriberId(1), "/subscribe").await;
        assert_eq!(reply.as_deref(), Some(INVALID_ADDRESS_REPLY));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_padded_address_is_invalid() {
        let registry = Arc::new(InMemorySubscriptionRegistry::new());
        let router = CommandRouter::new(registry.clone());
        let reply = router
            .route(SubscriberId(1), "/subscribe  1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")
            .await;
        assert_eq!(reply.as_deref(), Some(INVALID_ADDRESS_REPLY));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_registry_failure_gets_generic_reply() {
        let router = CommandRouter::new(Arc::new(UnavailableRegistry));
        let reply = router
            .route(SubscriberId(1), &format!("/subscribe {ADDRESS}"))
            .await;
        assert_eq!(reply.as_deref(), Some(FAILURE_REPLY));
    }

    #[tokio::test]
    async fn test_plain_text_gets_no_reply() {
        let router = CommandRouter::new(Arc::new(InMemorySubscriptionRegistry::new()));
        assert_eq!(router.route(SubscriberId(1), "gm").await, None);
    }
}
