//! Tests for the OpenAI extraction strategies, using wiremock to stand in
//! for the Chat Completions API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::super::base::{ExtractError, ExtractOutcome, FieldExtractor};
use super::config::OpenAIExtractorConfig;
use super::messages::{CompletionPayload, ExtractionPayload, strip_code_fences};
use crate::core::session::{CallSession, DialogueTurn, ReservationFields};

fn test_config(base_url: &str) -> OpenAIExtractorConfig {
    OpenAIExtractorConfig {
        api_key: "sk-test".to_string(),
        base_url: base_url.to_string(),
        model: "gpt-4o-mini".to_string(),
        timeout: Duration::from_secs(2),
    }
}

/// Chat-completion envelope whose assistant reply is `content`.
fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ]
    })
}

async fn mock_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(server)
        .await;
}

// =============================================================================
// Payload parsing
// =============================================================================

#[test]
fn test_strip_code_fences_passthrough() {
    assert_eq!(strip_code_fences("  {\"name\": \"x\"}  "), "{\"name\": \"x\"}");
}

#[test]
fn test_strip_code_fences_removes_json_fence() {
    let raw = "```json\n{\"name\": \"John\"}\n```";
    assert_eq!(strip_code_fences(raw), "{\"name\": \"John\"}");
}

#[test]
fn test_strip_code_fences_removes_bare_fence() {
    let raw = "```\n{\"name\": \"John\"}\n```";
    assert_eq!(strip_code_fences(raw), "{\"name\": \"John\"}");
}

#[test]
fn test_extraction_payload_blanks_become_unset() {
    let payload: ExtractionPayload =
        serde_json::from_str(r#"{"name": "John Smith", "date": "", "time": "  "}"#).unwrap();
    let fields = payload.into_fields();
    assert_eq!(fields.name.as_deref(), Some("John Smith"));
    assert_eq!(fields.date, None);
    assert_eq!(fields.time, None);
    assert_eq!(fields.party_size, None);
}

#[test]
fn test_completion_payload_parses_marker_and_fields() {
    let payload: CompletionPayload = serde_json::from_str(
        r#"{"status": "complete", "name": "John", "date": "Friday",
            "time": "7pm", "party_size": "4", "notes": "none"}"#,
    )
    .unwrap();
    assert_eq!(payload.status, "complete");
    let fields = payload.into_fields();
    assert!(fields.is_complete());
}

// =============================================================================
// Stateless strategy
// =============================================================================

#[tokio::test]
async fn test_stateless_extracts_fields() {
    let server = MockServer::start().await;
    mock_completion(
        &server,
        r#"{"name": "John Smith", "date": "", "time": "", "party_size": "", "notes": ""}"#,
    )
    .await;

    let extractor = super::StatelessExtractor::new(test_config(&server.uri())).unwrap();
    let outcome = extractor
        .extract(&CallSession::default(), "My name is John Smith")
        .await
        .unwrap();

    match outcome {
        ExtractOutcome::Fields(fields) => {
            assert_eq!(fields.name.as_deref(), Some("John Smith"));
            assert_eq!(fields.date, None);
        }
        other => panic!("expected Fields, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stateless_strips_markdown_fences() {
    let server = MockServer::start().await;
    mock_completion(
        &server,
        "```json\n{\"name\": \"Jane\", \"date\": \"\", \"time\": \"\", \"party_size\": \"\", \"notes\": \"\"}\n```",
    )
    .await;

    let extractor = super::StatelessExtractor::new(test_config(&server.uri())).unwrap();
    let outcome = extractor
        .extract(&CallSession::default(), "I'm Jane")
        .await
        .unwrap();
    assert!(
        matches!(outcome, ExtractOutcome::Fields(fields) if fields.name.as_deref() == Some("Jane"))
    );
}

#[tokio::test]
async fn test_stateless_malformed_json_contributes_nothing() {
    let server = MockServer::start().await;
    mock_completion(&server, "I'd be happy to help with that reservation!").await;

    let extractor = super::StatelessExtractor::new(test_config(&server.uri())).unwrap();
    let outcome = extractor
        .extract(&CallSession::default(), "My name is John")
        .await
        .unwrap();
    assert_eq!(outcome, ExtractOutcome::Fields(ReservationFields::default()));
}

#[tokio::test]
async fn test_stateless_server_error_surfaces_as_bad_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let extractor = super::StatelessExtractor::new(test_config(&server.uri())).unwrap();
    let result = extractor
        .extract(&CallSession::default(), "My name is John")
        .await;
    assert!(matches!(
        result,
        Err(ExtractError::BadStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_stateless_timeout_surfaces_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("{}"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.timeout = Duration::from_millis(200);
    let extractor = super::StatelessExtractor::new(config).unwrap();
    let result = extractor
        .extract(&CallSession::default(), "My name is John")
        .await;
    assert!(matches!(result, Err(ExtractError::Timeout(_))));
}

#[test]
fn test_missing_api_key_rejected_at_construction() {
    let mut config = test_config("http://localhost");
    config.api_key = String::new();
    let result = super::StatelessExtractor::new(config);
    assert!(matches!(result, Err(ExtractError::MissingApiKey)));
}

// =============================================================================
// Conversational strategy
// =============================================================================

#[tokio::test]
async fn test_conversational_free_form_reply_is_spoken() {
    let server = MockServer::start().await;
    mock_completion(&server, "Lovely! What date would you like to come in?").await;

    let extractor = super::ConversationalExtractor::new(test_config(&server.uri())).unwrap();
    let outcome = extractor
        .extract(&CallSession::default(), "I'd like a table please")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ExtractOutcome::Reply("Lovely! What date would you like to come in?".to_string())
    );
}

#[tokio::test]
async fn test_conversational_history_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("What date would you like"))
        .and(body_string_contains("Friday please"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("And what time?")))
        .mount(&server)
        .await;

    let mut session = CallSession::default();
    session.turns.push(DialogueTurn::user("A table please"));
    session
        .turns
        .push(DialogueTurn::assistant("What date would you like?"));

    let extractor = super::ConversationalExtractor::new(test_config(&server.uri())).unwrap();
    let outcome = extractor.extract(&session, "Friday please").await.unwrap();
    assert_eq!(outcome, ExtractOutcome::Reply("And what time?".to_string()));
}

#[tokio::test]
async fn test_conversational_completion_marker_finalizes() {
    let server = MockServer::start().await;
    mock_completion(
        &server,
        r#"{"status": "complete", "name": "John Smith", "date": "Friday",
            "time": "7pm", "party_size": "4", "notes": "none"}"#,
    )
    .await;

    let extractor = super::ConversationalExtractor::new(test_config(&server.uri())).unwrap();
    let outcome = extractor
        .extract(&CallSession::default(), "no special requests")
        .await
        .unwrap();

    match outcome {
        ExtractOutcome::Complete(fields) => {
            assert_eq!(fields.name.as_deref(), Some("John Smith"));
            assert!(fields.is_complete());
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}

#[tokio::test]
async fn test_conversational_malformed_completion_is_incomplete_turn() {
    let server = MockServer::start().await;
    mock_completion(&server, r#"{"status": "complete", "name": 12,"#).await;

    let extractor = super::ConversationalExtractor::new(test_config(&server.uri())).unwrap();
    let outcome = extractor
        .extract(&CallSession::default(), "that's everything")
        .await
        .unwrap();
    assert_eq!(outcome, ExtractOutcome::Fields(ReservationFields::default()));
}

#[tokio::test]
async fn test_conversational_structured_reply_without_marker_is_incomplete_turn() {
    let server = MockServer::start().await;
    mock_completion(&server, r#"{"status": "thinking"}"#).await;

    let extractor = super::ConversationalExtractor::new(test_config(&server.uri())).unwrap();
    let outcome = extractor
        .extract(&CallSession::default(), "hmm")
        .await
        .unwrap();
    assert_eq!(outcome, ExtractOutcome::Fields(ReservationFields::default()));
}
