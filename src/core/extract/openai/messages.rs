//! Request/response types for the OpenAI Chat Completions API, plus the
//! extraction payload shapes the model is prompted to emit.

use serde::{Deserialize, Serialize};

use crate::core::session::{DialogueTurn, ReservationFields, TurnRole};

/// One role-tagged message in a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Map a stored dialogue turn onto the wire role names.
    pub fn from_turn(turn: &DialogueTurn) -> Self {
        match turn.role {
            TurnRole::User => Self::user(turn.text.clone()),
            TurnRole::Assistant => Self::assistant(turn.text.clone()),
        }
    }
}

/// Chat-completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

/// Chat-completion response envelope (only the fields we read).
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// The first choice's trimmed content, if the model produced any.
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
    }
}

/// Wire shape of a strict extraction object: the five reservation keys, an
/// empty string meaning "not mentioned in this utterance".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractionPayload {
    pub name: String,
    pub date: String,
    pub time: String,
    pub party_size: String,
    pub notes: String,
}

impl ExtractionPayload {
    /// Convert to domain fields, mapping blank values to "unset".
    pub fn into_fields(self) -> ReservationFields {
        ReservationFields {
            name: nonempty(self.name),
            date: nonempty(self.date),
            time: nonempty(self.time),
            party_size: nonempty(self.party_size),
            notes: nonempty(self.notes),
        }
    }
}

/// Wire shape of the conversational strategy's completion object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompletionPayload {
    pub status: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub party_size: String,
    pub notes: String,
}

impl CompletionPayload {
    pub fn into_fields(self) -> ReservationFields {
        ReservationFields {
            name: nonempty(self.name),
            date: nonempty(self.date),
            time: nonempty(self.time),
            party_size: nonempty(self.party_size),
            notes: nonempty(self.notes),
        }
    }
}

fn nonempty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Strip the markdown code fences the model sometimes wraps around JSON
/// despite being told not to.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
