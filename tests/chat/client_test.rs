//! Tests for the chat completions client.

use std::sync::{Arc, Mutex};

use ai_services_mcp::chat::{ChatClient, CompletionOptions};
use ai_services_mcp::config::{ChatConfig, DEFAULT_STOP_SEQUENCES};
use ai_services_mcp::error::ToolError;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio_test::assert_ok;

use crate::support::{closed_port_url, spawn_upstream};

type Recorded = Arc<Mutex<Vec<Value>>>;

const STREAM_BODY: &str = concat!(
    "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n",
    "data: not-json\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n\n",
    "data: [DONE]\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"Z\"}}]}\n\n",
);

async fn record(State(recorded): State<Recorded>, Json(body): Json<Value>) -> impl IntoResponse {
    let stream = body["stream"].as_bool().unwrap_or(false);
    recorded.lock().unwrap().push(body);
    if stream {
        ([(header::CONTENT_TYPE, "text/event-stream")], STREAM_BODY).into_response()
    } else {
        Json(json!({
            "id": "cmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello"}}]
        }))
        .into_response()
    }
}

async fn recording_upstream() -> (ChatClient, Recorded) {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/v1/chat/completions", post(record))
        .with_state(Arc::clone(&recorded));
    (client_for(spawn_upstream(router).await), recorded)
}

fn client_for(base_url: String) -> ChatClient {
    ChatClient::new(ChatConfig {
        base_url,
        ..ChatConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn streaming_concatenates_fragments_until_done() {
    let (client, _) = recording_upstream().await;

    let text = assert_ok!(client.complete("Hi", CompletionOptions::default()).await);

    assert_eq!(text, "AB");
}

#[tokio::test]
async fn request_payload_uses_configured_defaults() {
    let (client, recorded) = recording_upstream().await;

    assert_ok!(client.complete("What is RAG?", CompletionOptions::default()).await);

    let requests = recorded.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let body = &requests[0];
    assert_eq!(
        body["messages"],
        json!([{"role": "user", "content": "What is RAG?"}])
    );
    assert_eq!(body["model"], "ibm-granite/granite-3.3-8b-instruct");
    assert_eq!(body["max_tokens"], 512);
    assert_eq!(body["temperature"], 0.0);
    assert_eq!(body["repetition_penalty"], 1.1);
    assert_eq!(body["stop"], json!(DEFAULT_STOP_SEQUENCES));
    assert_eq!(body["stream"], true);
}

#[tokio::test]
async fn caller_options_override_defaults() {
    let (client, recorded) = recording_upstream().await;
    let options = CompletionOptions {
        model: Some("mistral-7b".to_string()),
        max_tokens: Some(64),
        temperature: Some(0.7),
        stop: Some(vec!["END".to_string()]),
        stream: Some(false),
        ..CompletionOptions::default()
    };

    let text = assert_ok!(client.complete("Hi", options).await);

    assert_eq!(text, "Hello");
    let requests = recorded.lock().unwrap();
    let body = &requests[0];
    assert_eq!(body["model"], "mistral-7b");
    assert_eq!(body["max_tokens"], 64);
    assert_eq!(body["temperature"], 0.7);
    assert_eq!(body["stop"], json!(["END"]));
    assert_eq!(body["stream"], false);
}

#[tokio::test]
async fn non_streaming_without_choices_returns_whole_body() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({"object": "error", "message": "queue full"})) }),
    );
    let client = client_for(spawn_upstream(router).await);
    let options = CompletionOptions {
        stream: Some(false),
        ..CompletionOptions::default()
    };

    let text = assert_ok!(client.complete("Hi", options).await);

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["message"], "queue full");
    assert!(text.contains('\n'));
}

#[tokio::test]
async fn non_streaming_non_json_body_is_invalid_response() {
    let router = Router::new().route("/v1/chat/completions", post(|| async { "plain text" }));
    let client = client_for(spawn_upstream(router).await);
    let options = CompletionOptions {
        stream: Some(false),
        ..CompletionOptions::default()
    };

    let err = client.complete("Hi", options).await.unwrap_err();

    assert!(matches!(err, ToolError::InvalidResponse(_)));
}

#[tokio::test]
async fn error_status_carries_status_and_body() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model crashed") }),
    );
    let client = client_for(spawn_upstream(router).await);

    let err = client
        .complete("Hi", CompletionOptions::default())
        .await
        .unwrap_err();

    match &err {
        ToolError::UpstreamHttp { status, body } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "model crashed");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "HTTP error 500: model crashed");
}

#[tokio::test]
async fn connection_refused_is_request_error() {
    let client = client_for(closed_port_url().await);

    let err = client
        .complete("Hi", CompletionOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::UpstreamRequest(_)));
    assert!(err.to_string().starts_with("Request error:"));
}

#[tokio::test]
async fn broken_stream_ends_collection_without_error() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            let first = futures_util::stream::iter([Ok::<_, std::io::Error>(
                "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n",
            )]);
            let reset = futures_util::stream::once(async {
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                Err(std::io::Error::other("upstream reset"))
            });
            Body::from_stream(first.chain(reset))
        }),
    );
    let client = client_for(spawn_upstream(router).await);

    let text = assert_ok!(client.complete("Hi", CompletionOptions::default()).await);

    assert_eq!(text, "A");
}

#[tokio::test]
async fn stalled_stream_past_timeout_is_request_error() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            let first = futures_util::stream::iter([Ok::<_, std::io::Error>(
                "data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n\n",
            )]);
            let stalled = futures_util::stream::once(async {
                tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                Ok("data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n\n")
            });
            Body::from_stream(first.chain(stalled))
        }),
    );
    let client = ChatClient::new(ChatConfig {
        base_url: spawn_upstream(router).await,
        request_timeout_secs: 1,
        ..ChatConfig::default()
    })
    .unwrap();

    let err = client
        .complete("Hi", CompletionOptions::default())
        .await
        .unwrap_err();

    assert!(
        matches!(err, ToolError::UpstreamRequest(ref e) if e.is_timeout()),
        "expected timeout, got {err:?}"
    );
}

#[tokio::test]
async fn unreadable_error_body_still_reports_status() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            let failing = futures_util::stream::once(async {
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                Err::<&'static str, _>(std::io::Error::other("upstream reset"))
            });
            (
                StatusCode::BAD_GATEWAY,
                Body::from_stream(failing),
            )
        }),
    );
    let client = client_for(spawn_upstream(router).await);

    let err = client
        .complete("Hi", CompletionOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ToolError::UpstreamHttp { status: 502, ref body } if body.is_empty()
    ));
}
