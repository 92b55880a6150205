//! Telephony voice webhook handlers.
//!
//! Every code path here answers with valid TwiML: an unanswered webhook
//! leaves the caller on a dead line, so model failures degrade to a spoken
//! re-prompt and are logged for operator visibility rather than surfaced as
//! HTTP errors.

use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::dialogue;
use crate::core::extract::{ExtractOutcome, FieldExtractor};
use crate::core::reservations::ReservationRecord;
use crate::core::session::DialogueTurn;
use crate::core::twiml::VoiceResponseBuilder;
use crate::state::AppState;

/// Form payload the telephony provider posts on each speech turn.
#[derive(Debug, Deserialize)]
pub struct SpeechForm {
    /// Transcribed caller speech; empty when only silence or noise was heard
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: String,
    /// Opaque call identifier assigned by the provider
    #[serde(rename = "CallSid", default = "unknown_call_sid")]
    pub call_sid: String,
}

fn unknown_call_sid() -> String {
    "unknown".to_string()
}

fn twiml_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

/// `POST /incoming-call` — initial greeting.
///
/// Speaks the greeting inside a speech gather; if the gather finishes with
/// no usable input, the trailing fallback apologizes and hangs up.
pub async fn incoming_call(State(state): State<Arc<AppState>>) -> Response {
    let builder = state.response_builder();
    twiml_response(builder.gather_prompt_with_fallback(dialogue::GREETING, dialogue::UNAVAILABLE))
}

/// `POST /process-speech` — one dialogue turn.
pub async fn process_speech(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SpeechForm>,
) -> Response {
    let speech = form.speech_result.trim().to_string();
    let call_sid = form.call_sid;
    let builder = state.response_builder();

    info!(call_sid = %call_sid, speech = %speech, "speech turn");

    let session = state.sessions.get_or_create(&call_sid);

    // Silence or noise: re-prompt without touching session state.
    if speech.is_empty() {
        return twiml_response(builder.gather_prompt(dialogue::REPROMPT));
    }

    let outcome = match state.extractor.extract(&session, &speech).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(
                call_sid = %call_sid,
                strategy = state.extractor.name(),
                error = %err,
                "model call failed; asking the caller to repeat"
            );
            return twiml_response(builder.gather_prompt(dialogue::FALLBACK_PROMPT));
        }
    };

    match outcome {
        ExtractOutcome::Fields(partial) => {
            let merged = state.sessions.merge_fields(&call_sid, &partial);
            match dialogue::next_prompt(&merged) {
                Some(question) => twiml_response(builder.gather_prompt(question)),
                None => finalize(&state, &builder, &call_sid),
            }
        }
        ExtractOutcome::Reply(text) => {
            state.sessions.push_turn(&call_sid, DialogueTurn::user(&speech));
            state
                .sessions
                .push_turn(&call_sid, DialogueTurn::assistant(&text));
            twiml_response(builder.gather_prompt(&text))
        }
        ExtractOutcome::Complete(fields) => {
            state.sessions.push_turn(&call_sid, DialogueTurn::user(&speech));
            let merged = state.sessions.merge_fields(&call_sid, &fields);
            match dialogue::next_prompt(&merged) {
                // The model declared completion with a hole in the fields;
                // keep asking rather than confirming a broken reservation.
                // The question goes into the history so the next model round
                // trip sees what the caller was asked.
                Some(question) => {
                    warn!(call_sid = %call_sid, "completion object missing fields; continuing dialogue");
                    state
                        .sessions
                        .push_turn(&call_sid, DialogueTurn::assistant(question));
                    twiml_response(builder.gather_prompt(question))
                }
                None => finalize(&state, &builder, &call_sid),
            }
        }
    }
}

/// Record the reservation, evict the session, confirm, and hang up.
fn finalize(state: &AppState, builder: &VoiceResponseBuilder, call_sid: &str) -> Response {
    match state.sessions.complete_and_evict(call_sid) {
        Ok(session) => {
            let record = ReservationRecord::from_fields(call_sid, &session.fields);
            let confirmation = dialogue::confirmation(&record);
            state.reservations.append(record);
            info!(
                call_sid = %call_sid,
                total = state.reservations.len(),
                "reservation confirmed"
            );
            twiml_response(builder.say_and_hangup(&confirmation))
        }
        Err(err) => {
            // A duplicate delivery already recorded and evicted this call.
            warn!(call_sid = %call_sid, error = %err, "completion turn for an already-evicted session");
            twiml_response(builder.say_and_hangup(dialogue::GENERIC_CONFIRMATION))
        }
    }
}
