//! Configuration types.
//!
//! Transport credentials and the review-channel identity come from the
//! environment; all canned text (welcome, FAQ, greetings, phrase table)
//! ships as defaults and is treated as read-only input by the router.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Welcome text sent for `/start` and for greeting phrases.
pub const WELCOME_MESSAGE: &str = "Welcome to our Support Bot! 👋\n\
I'm here to help you with your questions and issues.\n\n\
Use these commands to get started:\n\
/start - See this welcome message\n\
/faq - Access our Frequently Asked Questions\n\
/ticket - Create a new support ticket\n\n\
Or just send me a message and I'll try to help you directly.";

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram Bot API token.
    pub bot_token: String,
    /// Chat ID of the shared review channel agents reply from.
    pub review_chat_id: String,
    /// Path of the persisted ticket store.
    pub data_file: PathBuf,
    /// Link included in the FAQ reply.
    pub faq_url: String,
    /// Welcome text for `/start` and greetings.
    pub welcome_message: String,
    /// Greeting phrases that trigger the welcome text. Checked before the
    /// canned-response table; first match wins.
    pub greetings: Vec<String>,
    /// Ordered canned-response table: (phrase, reply). A `Vec`, not a map,
    /// because matching is by fixed enumeration order.
    pub canned_responses: Vec<(String, String)>,
}

impl BotConfig {
    /// Build a config with default texts and the given credentials.
    pub fn with_defaults(bot_token: String, review_chat_id: String) -> Self {
        Self {
            bot_token,
            review_chat_id,
            data_file: PathBuf::from("data.json"),
            faq_url: String::new(),
            welcome_message: WELCOME_MESSAGE.to_string(),
            greetings: ["hello", "hi", "hey", "greetings", "howdy"]
                .into_iter()
                .map(String::from)
                .collect(),
            canned_responses: vec![
                (
                    "help".to_string(),
                    "I'm here to help! You can ask me a question or create a support ticket \
                     with /ticket."
                        .to_string(),
                ),
                (
                    "help me".to_string(),
                    "I'll do my best to help you. Could you describe your issue or use /ticket \
                     to create a support ticket?"
                        .to_string(),
                ),
            ],
        }
    }

    /// Read configuration from the environment.
    ///
    /// `TELEGRAM_BOT_TOKEN` and `REVIEW_CHAT_ID` are required;
    /// `FAQ_URL` and `TICKET_DATA_FILE` are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".into()))?;
        let review_chat_id = std::env::var("REVIEW_CHAT_ID")
            .map_err(|_| ConfigError::MissingEnvVar("REVIEW_CHAT_ID".into()))?;

        let mut config = Self::with_defaults(bot_token, review_chat_id);
        if let Ok(url) = std::env::var("FAQ_URL") {
            config.faq_url = url;
        }
        if let Ok(path) = std::env::var("TICKET_DATA_FILE") {
            config.data_file = PathBuf::from(path);
        }
        Ok(config)
    }

    /// FAQ reply text.
    pub fn faq_message(&self) -> String {
        format!(
            "You can find answers to common questions at: {}",
            self.faq_url
        )
    }

    /// Confirmation for an explicitly created ticket.
    pub fn ticket_created_message(&self, ticket_id: u64) -> String {
        format!("Your ticket #{ticket_id} has been created. We'll get back to you soon!")
    }
}
