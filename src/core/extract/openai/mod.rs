//! OpenAI chat-completion extraction strategies.
//!
//! Both reservation extraction strategies run against the OpenAI Chat
//! Completions API:
//!
//! - [`StatelessExtractor`] sends a fixed extraction-only system prompt plus
//!   the single utterance each turn and expects a strict JSON object with the
//!   five reservation keys.
//! - [`ConversationalExtractor`] sends the full dialogue history and lets the
//!   model run the conversation until it emits a `"status": "complete"`
//!   object.

mod client;
mod config;
mod messages;

#[cfg(test)]
mod tests;

pub use client::{ConversationalExtractor, StatelessExtractor};
pub use config::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, OPENAI_API_BASE,
    OpenAIExtractorConfig,
};
pub use messages::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CompletionPayload,
    ExtractionPayload, strip_code_fences,
};
