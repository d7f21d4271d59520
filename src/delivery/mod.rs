//! Report delivery: chunking, bounded retry, and the messaging endpoint.
//!
//! Delivery is the only pipeline stage allowed to fail a tick. The state
//! machine per chunk is `Pending -> Sending -> (Success | retry | Fatal)`;
//! the overall outcome is Success only when every chunk lands, and a failure
//! names the chunk that died without retrying chunks that already succeeded.

mod chunk;
mod retry;
mod spool;
mod telegram;

use async_trait::async_trait;

use crate::error::DeliveryError;

pub use chunk::{chunk_message, strip_marker};
pub use retry::RetryPolicy;
pub use spool::Spool;
pub use telegram::TelegramDelivery;

/// Classification of one transmission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    RetryableFailure,
    FatalFailure,
}

/// Record of a single network call for a single chunk.
#[derive(Debug, Clone)]
pub struct DeliveryAttempt {
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    pub status: Option<u16>,
    pub error: Option<String>,
}

/// Terminal result of delivering one report.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// Every chunk was acknowledged by the endpoint.
    Success {
        chunks: usize,
        attempts: Vec<DeliveryAttempt>,
    },
    /// A chunk hit a fatal error or exhausted its retries.
    Failed {
        chunk_index: usize,
        chunks: usize,
        error: DeliveryError,
        attempts: Vec<DeliveryAttempt>,
    },
}

impl DeliveryOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Success { .. })
    }

    /// All attempt records made while producing this outcome.
    #[must_use]
    pub fn attempts(&self) -> &[DeliveryAttempt] {
        match self {
            DeliveryOutcome::Success { attempts, .. }
            | DeliveryOutcome::Failed { attempts, .. } => attempts,
        }
    }
}

/// Outbound sink for rendered report text.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Deliver the text, chunking and retrying as needed.
    async fn deliver(&self, text: &str) -> DeliveryOutcome;
}
