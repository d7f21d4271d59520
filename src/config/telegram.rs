//! Telegram endpoint configuration.
//!
//! The bot token never lives in the config file; only the name of the
//! environment variable that holds it does.

use serde::Deserialize;

use crate::delivery::RetryPolicy;
use crate::error::{ConfigError, Error};

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Target chat ID for alerts.
    pub chat_id: i64,

    /// Bot API base URL; overridable for tests.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Markup mode negotiated with the endpoint; plain text when unset.
    #[serde(default)]
    pub parse_mode: Option<String>,

    /// Maximum accepted message length, in characters.
    #[serde(default = "default_message_limit")]
    pub message_limit: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the bot token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_message_limit() -> usize {
    4096
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_token_env() -> String {
    "TELEGRAM_BOT_TOKEN".to_string()
}

impl TelegramConfig {
    /// Resolve the bot token from the environment.
    pub fn token(&self) -> Result<String, Error> {
        std::env::var(&self.token_env).map_err(|_| {
            Error::Config(ConfigError::InvalidValue {
                field: "telegram.token_env",
                reason: format!("environment variable {} is not set", self.token_env),
            })
        })
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.chat_id == 0 {
            return Err(ConfigError::MissingField {
                field: "telegram.chat_id",
            });
        }
        if self.message_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "telegram.message_limit",
                reason: "must be positive".to_string(),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "telegram.retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
