//! Telegram Bot API delivery adapter.
//!
//! Talks to `sendMessage` directly over HTTPS. Responses are classified into
//! the retry taxonomy: credential and destination problems are fatal,
//! rate limits honor the server's wait hint, everything else is retried up
//! to the policy bound. The bot token only ever appears in the request URL;
//! transport errors are stripped of their URL before they can be logged.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::TelegramConfig;
use crate::error::{DeliveryError, Error};

use super::chunk::chunk_message;
use super::retry::RetryPolicy;
use super::{AttemptOutcome, DeliveryAttempt, DeliveryOutcome, DeliverySink};

/// Fallback wait when a rate-limit response carries no hint, in seconds.
const DEFAULT_RATE_LIMIT_WAIT_SECS: u64 = 5;

pub struct TelegramDelivery {
    http: reqwest::Client,
    endpoint: String,
    chat_id: i64,
    parse_mode: Option<String>,
    message_limit: usize,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

impl TelegramDelivery {
    /// Build the adapter. The token comes from the environment, not the
    /// config file, and is embedded only in the request URL.
    pub fn new(config: &TelegramConfig, token: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}/sendMessage", config.api_url, token),
            chat_id: config.chat_id,
            parse_mode: config.parse_mode.clone(),
            message_limit: config.message_limit,
            retry: config.retry.clone(),
        })
    }

    async fn send_chunk(&self, text: &str) -> Result<(), DeliveryError> {
        let request = SendMessage {
            chat_id: self.chat_id,
            text,
            parse_mode: self.parse_mode.as_deref(),
            disable_web_page_preview: true,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.without_url()))?;

        let status = response.status().as_u16();
        let body: Option<ApiResponse> = response.json().await.ok();

        match body {
            Some(api) if api.ok => Ok(()),
            Some(api) => {
                let retry_after = api.parameters.and_then(|p| p.retry_after);
                let description = api
                    .description
                    .unwrap_or_else(|| "no description".to_string());
                Err(classify(status, description, retry_after))
            }
            None => Err(classify(status, "unreadable response body".to_string(), None)),
        }
    }

    /// Send one chunk, retrying transient failures up to the policy bound.
    async fn deliver_chunk(
        &self,
        chunk_index: usize,
        total_chunks: usize,
        text: &str,
        attempts: &mut Vec<DeliveryAttempt>,
    ) -> Result<(), DeliveryError> {
        let mut attempt = 1u32;
        loop {
            match self.send_chunk(text).await {
                Ok(()) => {
                    attempts.push(DeliveryAttempt {
                        chunk_index,
                        total_chunks,
                        attempt,
                        outcome: AttemptOutcome::Success,
                        status: Some(200),
                        error: None,
                    });
                    debug!(chunk = chunk_index + 1, total = total_chunks, "Chunk delivered");
                    return Ok(());
                }
                Err(error) => {
                    let fatal = error.is_fatal();
                    attempts.push(DeliveryAttempt {
                        chunk_index,
                        total_chunks,
                        attempt,
                        outcome: if fatal {
                            AttemptOutcome::FatalFailure
                        } else {
                            AttemptOutcome::RetryableFailure
                        },
                        status: error.status(),
                        error: Some(error.to_string()),
                    });

                    if fatal {
                        warn!(
                            chunk = chunk_index + 1,
                            status = ?error.status(),
                            error = %error,
                            "Fatal delivery error, not retrying"
                        );
                        return Err(error);
                    }
                    if attempt >= self.retry.max_attempts {
                        return Err(DeliveryError::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(error),
                        });
                    }

                    let delay = match &error {
                        DeliveryError::RateLimited { retry_after_secs } => {
                            Duration::from_secs(*retry_after_secs)
                        }
                        _ => self.retry.delay_after(attempt),
                    };
                    debug!(
                        chunk = chunk_index + 1,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Transient delivery error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl DeliverySink for TelegramDelivery {
    async fn deliver(&self, text: &str) -> DeliveryOutcome {
        let chunks = chunk_message(text, self.message_limit);
        let total = chunks.len();
        let mut attempts = Vec::new();

        for (index, chunk) in chunks.iter().enumerate() {
            if let Err(error) = self
                .deliver_chunk(index, total, chunk, &mut attempts)
                .await
            {
                return DeliveryOutcome::Failed {
                    chunk_index: index,
                    chunks: total,
                    error,
                    attempts,
                };
            }
        }

        info!(chunks = total, "Report delivered");
        DeliveryOutcome::Success {
            chunks: total,
            attempts,
        }
    }
}

/// Map an endpoint error response onto the retry taxonomy.
fn classify(status: u16, description: String, retry_after: Option<u64>) -> DeliveryError {
    match status {
        // Bad or revoked token. Telegram answers 401 or 404 for these.
        401 | 404 => DeliveryError::Auth {
            status,
            description,
        },
        // Bot blocked by the user or kicked from the chat.
        403 => DeliveryError::BadDestination {
            status,
            description,
        },
        400 if description.to_lowercase().contains("chat not found") => {
            DeliveryError::BadDestination {
                status,
                description,
            }
        }
        429 => DeliveryError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RATE_LIMIT_WAIT_SECS),
        },
        _ => DeliveryError::Endpoint {
            status,
            description,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_statuses_are_fatal() {
        let err = classify(401, "Unauthorized".to_string(), None);
        assert!(err.is_fatal());
        assert_eq!(err.status(), Some(401));

        let err = classify(404, "Not Found".to_string(), None);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unknown_chat_is_fatal() {
        let err = classify(400, "Bad Request: chat not found".to_string(), None);
        assert!(err.is_fatal());

        let err = classify(400, "Bad Request: message is too long".to_string(), None);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_rate_limit_carries_hint() {
        let err = classify(429, "Too Many Requests".to_string(), Some(17));
        assert!(!err.is_fatal());
        match err {
            DeliveryError::RateLimited { retry_after_secs } => {
                assert_eq!(retry_after_secs, 17);
            }
            other => panic!("expected RateLimited, got {other}"),
        }
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = classify(502, "Bad Gateway".to_string(), None);
        assert!(!err.is_fatal());
        assert_eq!(err.status(), Some(502));
    }
}
