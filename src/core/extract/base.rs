//! Base trait and types for field-extraction strategies.
//!
//! A `FieldExtractor` interprets one caller utterance against the session so
//! far and reports what the turn produced. Two strategies implement the
//! contract: stateless per-turn extraction and conversational dialogue (see
//! the `openai` module). Which one runs is a configuration choice, not a
//! separate binary.
//!
//! # Error policy
//!
//! Transport and timeout failures surface as `ExtractError` so the webhook
//! handler can degrade to a spoken re-prompt; they must never propagate as an
//! unanswered webhook, which would leave the caller on a dead line. Malformed
//! model output is absorbed *inside* the strategies: the turn simply
//! contributes nothing and the dialogue continues.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::session::{CallSession, ReservationFields};

/// Errors that can occur during a model extraction call.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Model API key not configured
    #[error("Model API key not configured")]
    MissingApiKey,

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Network-level failure reaching the model provider
    #[error("Model request failed: {0}")]
    Transport(String),

    /// The bounded request timeout expired
    #[error("Model request timed out after {0} ms")]
    Timeout(u64),

    /// The model provider answered with a non-success status
    #[error("Model returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// The provider envelope itself could not be decoded
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// What one speech turn produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractOutcome {
    /// Partial fields inferred from the utterance; the dialogue controller
    /// picks the next question. An all-empty partial means the turn
    /// contributed nothing.
    Fields(ReservationFields),
    /// The model continues the dialogue with its own prompt, spoken verbatim
    /// (conversational strategy only).
    Reply(String),
    /// The model judged every field gathered and emitted its completion
    /// object (conversational strategy only).
    Complete(ReservationFields),
}

/// One field-extraction strategy.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Interpret one caller utterance. `session` is a snapshot taken before
    /// this turn; strategies must not assume the utterance is already in its
    /// history.
    async fn extract(
        &self,
        session: &CallSession,
        utterance: &str,
    ) -> ExtractResult<ExtractOutcome>;

    /// Strategy name for logs.
    fn name(&self) -> &'static str;
}
