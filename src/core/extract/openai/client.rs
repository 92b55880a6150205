//! OpenAI chat-completion client and the two extraction strategies built on
//! it.
//!
//! The shared [`ChatClient`] owns the reqwest client with bounded connect and
//! request timeouts; a timeout maps to [`ExtractError::Timeout`] and is
//! handled by the webhook layer exactly like any other transport failure.
//! Malformed *extraction* output never becomes an error: the strategies
//! absorb it and report a turn that contributed nothing, so the dialogue
//! keeps moving.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::super::base::{ExtractError, ExtractOutcome, ExtractResult, FieldExtractor};
use super::config::{DEFAULT_CONNECT_TIMEOUT_SECS, OpenAIExtractorConfig};
use super::messages::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CompletionPayload,
    ExtractionPayload, strip_code_fences,
};
use crate::core::session::{CallSession, ReservationFields};

/// User-Agent header value for API requests.
const USER_AGENT: &str = concat!("Reserva-Gateway/", env!("CARGO_PKG_VERSION"));

/// Sampling temperature; extraction wants determinism.
const TEMPERATURE: f32 = 0.0;

/// Status marker the conversational strategy emits once every field is
/// gathered.
const COMPLETE_STATUS: &str = "complete";

/// System prompt for the stateless, extraction-only strategy.
const EXTRACTION_SYSTEM_PROMPT: &str = r#"
You are an extraction-only assistant for a voice reservation system.

You NEVER ask questions and you NEVER chat.

Your ONLY job is:
Given a SINGLE user message, extract these fields IF they are present:

{
  "name": "",
  "date": "",
  "time": "",
  "party_size": "",
  "notes": ""
}

Rules:
- Always respond with EXACTLY one JSON object.
- No markdown, no ``` fences, no text before or after JSON.
- If a field is not clearly mentioned, leave it as an empty string "".
- If the user explicitly declines a field (for example "no special requests"), set it to "none".
- Do NOT infer or guess missing fields.
- Do NOT ask questions.
- Do NOT explain anything.
- Output ONLY valid JSON.
"#;

/// System prompt for the conversational strategy.
const CONVERSATION_SYSTEM_PROMPT: &str = r#"
You are a friendly voice assistant taking restaurant reservations over the phone.

Collect exactly these details from the caller: full name, date, time, party size,
and any special requests.

Rules:
- Keep every reply short and speakable: at most one sentence, then one question.
- Ask for exactly one missing detail at a time.
- Never ask for a detail the caller has already given.
- If the caller declines special requests, record notes as "none".
- Until every detail is collected, reply in plain spoken English and never output JSON.
- Once every detail is collected, reply with EXACTLY one JSON object and nothing else:
{"status": "complete", "name": "", "date": "", "time": "", "party_size": "", "notes": ""}
  with the collected values filled in.
"#;

/// Shared chat-completion plumbing for both strategies.
#[derive(Debug)]
struct ChatClient {
    http: Client,
    config: OpenAIExtractorConfig,
}

impl ChatClient {
    fn new(config: OpenAIExtractorConfig) -> ExtractResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ExtractError::MissingApiKey);
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ExtractError::ClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// One chat-completion round trip, returning the assistant's trimmed
    /// reply text.
    async fn complete(&self, messages: Vec<ChatMessage>) -> ExtractResult<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: TEMPERATURE,
            messages,
        };

        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    ExtractError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::MalformedResponse(e.to_string()))?;

        envelope
            .into_content()
            .ok_or_else(|| ExtractError::MalformedResponse("response carried no content".into()))
    }
}

/// Stateless extraction: one field-extraction model call per turn, no
/// dialogue history. The dialogue controller asks every question.
#[derive(Debug)]
pub struct StatelessExtractor {
    client: ChatClient,
}

impl StatelessExtractor {
    pub fn new(config: OpenAIExtractorConfig) -> ExtractResult<Self> {
        Ok(Self {
            client: ChatClient::new(config)?,
        })
    }
}

#[async_trait]
impl FieldExtractor for StatelessExtractor {
    async fn extract(
        &self,
        _session: &CallSession,
        utterance: &str,
    ) -> ExtractResult<ExtractOutcome> {
        let messages = vec![
            ChatMessage::system(EXTRACTION_SYSTEM_PROMPT),
            ChatMessage::user(utterance),
        ];
        let raw = self.client.complete(messages).await?;
        debug!(raw = %raw, "raw extraction output");

        let stripped = strip_code_fences(&raw);
        match serde_json::from_str::<ExtractionPayload>(stripped) {
            Ok(payload) => Ok(ExtractOutcome::Fields(payload.into_fields())),
            Err(err) => {
                warn!(error = %err, "extraction output was not valid JSON; turn contributes nothing");
                Ok(ExtractOutcome::Fields(ReservationFields::default()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "stateless"
    }
}

/// Conversational extraction: the model carries the dialogue, one spoken
/// reply per turn, until it emits the completion object.
#[derive(Debug)]
pub struct ConversationalExtractor {
    client: ChatClient,
}

impl ConversationalExtractor {
    pub fn new(config: OpenAIExtractorConfig) -> ExtractResult<Self> {
        Ok(Self {
            client: ChatClient::new(config)?,
        })
    }
}

#[async_trait]
impl FieldExtractor for ConversationalExtractor {
    async fn extract(
        &self,
        session: &CallSession,
        utterance: &str,
    ) -> ExtractResult<ExtractOutcome> {
        let mut messages = Vec::with_capacity(session.turns.len() + 2);
        messages.push(ChatMessage::system(CONVERSATION_SYSTEM_PROMPT));
        messages.extend(session.turns.iter().map(ChatMessage::from_turn));
        messages.push(ChatMessage::user(utterance));

        let raw = self.client.complete(messages).await?;
        debug!(raw = %raw, "raw conversational reply");

        let stripped = strip_code_fences(&raw);
        if !stripped.starts_with('{') {
            // Still talking: the reply is the next spoken prompt.
            return Ok(ExtractOutcome::Reply(stripped.to_string()));
        }

        match serde_json::from_str::<CompletionPayload>(stripped) {
            Ok(payload) if payload.status.eq_ignore_ascii_case(COMPLETE_STATUS) => {
                Ok(ExtractOutcome::Complete(payload.into_fields()))
            }
            Ok(payload) => {
                warn!(status = %payload.status, "structured reply without completion status; treating turn as incomplete");
                Ok(ExtractOutcome::Fields(ReservationFields::default()))
            }
            Err(err) => {
                warn!(error = %err, "structured-looking reply failed to parse; treating turn as incomplete");
                Ok(ExtractOutcome::Fields(ReservationFields::default()))
            }
        }
    }

    fn name(&self) -> &'static str {
        "conversational"
    }
}
