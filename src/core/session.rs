//! Call session store.
//!
//! Tracks in-flight reservation state keyed by the telephony provider's call
//! SID. A session exists only between the first speech turn for a call and
//! the turn at which all five fields are gathered (or the call ends); it is
//! created lazily, mutated by extraction results, and removed on completion.
//!
//! # Concurrency
//!
//! The store clones sessions out rather than handing out map guards, so no
//! lock is ever held across the model round trip. Duplicate webhook delivery
//! for the same call SID is not coordinated: if two turns for one call race,
//! the merge is last-write-wins per field. This is an accepted limitation of
//! the webhook model, not something the store papers over with locking.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for session-store operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No active session exists for the given call SID
    #[error("No active session for call '{0}'")]
    UnknownCall(String),
}

/// The five reservation fields, each unset until the caller provides it.
///
/// `None` means "not yet mentioned". An explicitly declined field (the caller
/// says "no special requests") is stored as the non-empty sentinel the
/// extractor emits, so it counts as gathered and is never re-asked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationFields {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub party_size: Option<String>,
    pub notes: Option<String>,
}

impl ReservationFields {
    /// Merge non-empty values from a partial extraction into this set.
    ///
    /// Idempotent-merge semantics: the last non-empty value wins per field,
    /// and a field that was set earlier is never cleared by an extraction
    /// that omits it.
    pub fn merge(&mut self, partial: &ReservationFields) {
        merge_field(&mut self.name, &partial.name);
        merge_field(&mut self.date, &partial.date);
        merge_field(&mut self.time, &partial.time);
        merge_field(&mut self.party_size, &partial.party_size);
        merge_field(&mut self.notes, &partial.notes);
    }

    /// True once every field holds a non-empty value.
    pub fn is_complete(&self) -> bool {
        [
            &self.name,
            &self.date,
            &self.time,
            &self.party_size,
            &self.notes,
        ]
        .iter()
        .all(|field| matches!(field, Some(v) if !v.trim().is_empty()))
    }
}

fn merge_field(current: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            *current = Some(trimmed.to_string());
        }
    }
}

/// Speaker of one dialogue turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One transcribed or spoken unit of the dialogue.
///
/// Only the conversational extraction strategy reads the history; the
/// stateless strategy leaves it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub role: TurnRole,
    pub text: String,
}

impl DialogueTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }
}

/// Per-call reservation and dialogue state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSession {
    pub fields: ReservationFields,
    pub turns: Vec<DialogueTurn>,
}

/// Process-wide map from call SID to in-flight session state.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: DashMap<String, CallSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of the session for `call_sid`, creating an empty
    /// one first if this is the call's first speech turn.
    pub fn get_or_create(&self, call_sid: &str) -> CallSession {
        self.inner
            .entry(call_sid.to_string())
            .or_default()
            .clone()
    }

    /// Merge a partial extraction into the stored session and return the
    /// merged field set. Creates the session if it is somehow absent.
    pub fn merge_fields(&self, call_sid: &str, partial: &ReservationFields) -> ReservationFields {
        let mut entry = self.inner.entry(call_sid.to_string()).or_default();
        entry.fields.merge(partial);
        entry.fields.clone()
    }

    /// Append a dialogue turn to the session history.
    pub fn push_turn(&self, call_sid: &str, turn: DialogueTurn) {
        self.inner
            .entry(call_sid.to_string())
            .or_default()
            .turns
            .push(turn);
    }

    /// Remove and return the finished session.
    ///
    /// Completing an absent call SID is an error; it means the session was
    /// never created or was already evicted by an earlier completion turn.
    pub fn complete_and_evict(&self, call_sid: &str) -> SessionResult<CallSession> {
        self.inner
            .remove(call_sid)
            .map(|(_, session)| session)
            .ok_or_else(|| SessionError::UnknownCall(call_sid.to_string()))
    }

    /// Number of in-flight sessions.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// True when a session exists for the call SID.
    pub fn contains(&self, call_sid: &str) -> bool {
        self.inner.contains_key(call_sid)
    }
}
