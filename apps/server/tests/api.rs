use std::{path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use futures::StreamExt;
use parley_ai::{
    stream_error_marker, CompletionGateway, FakeCompletionProvider, DEFAULT_GEMINI_MODEL,
};
use parley_core::errors::{DatabaseError, Error};
use parley_core::exchanges::{Exchange, ExchangeRepositoryTrait, ExchangeService, NewExchange};
use parley_server::{api::app_router, build_state_with_provider, config::Config, AppState};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    provider: Arc<FakeCompletionProvider>,
    _dir: TempDir,
}

impl TestApp {
    fn stored(&self) -> Vec<Exchange> {
        self.state.exchange_service.recent_exchanges(100).unwrap()
    }
}

fn test_config(db_path: &Path) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: db_path.to_string_lossy().to_string(),
        gemini_api_key: "test-key".to_string(),
        gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        cors_allow: vec!["*".to_string()],
        static_dir: None,
    }
}

async fn build_test_app(provider: FakeCompletionProvider) -> TestApp {
    let dir = tempdir().unwrap();
    let config = test_config(&dir.path().join("test.db"));
    let provider = Arc::new(provider);
    let state = build_state_with_provider(&config, provider.clone())
        .await
        .unwrap();
    TestApp {
        router: app_router(state.clone(), &config),
        state,
        provider,
        _dir: dir,
    }
}

async fn post_chat(app: &TestApp, body: &str) -> Response {
    app.router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get(app: &TestApp, uri: &str) -> Response {
    app.router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn hello_returns_fixed_payload() {
    let app = build_test_app(FakeCompletionProvider::with_fragments(&["unused"])).await;

    let response = get(&app, "/api/hello").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "message": "Hello from Python backend!" })
    );
    assert!(app.stored().is_empty());
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = build_test_app(FakeCompletionProvider::with_fragments(&["unused"])).await;

    let response = get(&app, "/api/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn chat_streams_reply_and_records_exchange() {
    let app = build_test_app(FakeCompletionProvider::with_fragments(&["Hel", "lo!"])).await;

    let response = post_chat(
        &app,
        r#"{"user_message": "hi", "selected_model": "gemini"}"#,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(body_text(response).await, "Hello!");

    let stored = app.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_message, "hi");
    assert_eq!(stored[0].ai_response, "Hello!");
    assert_eq!(stored[0].model, "gemini");
}

#[tokio::test]
async fn chat_trims_message_and_defaults_model_label() {
    let app = build_test_app(FakeCompletionProvider::with_fragments(&["ok"])).await;

    let response = post_chat(&app, r#"{"user_message": "  hello there \n"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let stored = app.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_message, "hello there");
    assert_eq!(stored[0].model, "gemini");
}

#[tokio::test]
async fn chat_keeps_caller_supplied_model_label() {
    let app = build_test_app(FakeCompletionProvider::with_fragments(&["ok"])).await;

    let response = post_chat(
        &app,
        r#"{"user_message": "hi", "selected_model": "gemini-pro"}"#,
    )
    .await;
    body_text(response).await;

    assert_eq!(app.stored()[0].model, "gemini-pro");
}

#[tokio::test]
async fn blank_message_is_rejected_without_side_effects() {
    let app = build_test_app(FakeCompletionProvider::with_fragments(&["unused"])).await;

    for body in [
        r#"{"user_message": ""}"#,
        r#"{"user_message": "   \t\n"}"#,
        r#"{"selected_model": "gemini"}"#,
        r#"{}"#,
    ] {
        let response = post_chat(&app, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "User message is required" })
        );
    }

    assert_eq!(app.provider.call_count(), 0);
    assert!(app.stored().is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_server_error() {
    let app = build_test_app(FakeCompletionProvider::with_fragments(&["unused"])).await;

    let response = post_chat(&app, "{not json").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Invalid request body"));

    assert_eq!(app.provider.call_count(), 0);
    assert!(app.stored().is_empty());
}

#[tokio::test]
async fn mid_stream_fault_is_folded_into_body_and_recorded() {
    let app = build_test_app(FakeCompletionProvider::failing_after(
        &["partial ", "answer"],
        "connection reset",
    ))
    .await;

    let response = post_chat(&app, r#"{"user_message": "hi"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;

    let expected = format!(
        "partial answer{}",
        stream_error_marker("Provider error: connection reset")
    );
    assert_eq!(body, expected);

    let stored = app.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].ai_response, expected);
}

#[tokio::test]
async fn immediate_fault_records_marker_only() {
    let app = build_test_app(FakeCompletionProvider::failing_after::<&str>(
        &[],
        "quota exceeded",
    ))
    .await;

    let response = post_chat(&app, r#"{"user_message": "hi"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("[Stream error: "));

    let stored = app.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].ai_response, body);
}

#[tokio::test]
async fn upstream_open_failure_is_a_server_error() {
    let app = build_test_app(FakeCompletionProvider::failing_to_open("invalid api key")).await;

    let response = post_chat(&app, r#"{"user_message": "hi"}"#).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("invalid api key"));

    assert!(app.stored().is_empty());
}

#[tokio::test]
async fn history_is_empty_initially() {
    let app = build_test_app(FakeCompletionProvider::with_fragments(&["unused"])).await;

    let response = get(&app, "/api/history").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "history": [] }));
}

#[tokio::test]
async fn history_returns_twenty_most_recent_newest_first() {
    let app = build_test_app(FakeCompletionProvider::with_fragments(&["reply"])).await;

    for n in 1..=25 {
        let response = post_chat(&app, &format!(r#"{{"user_message": "message {}"}}"#, n)).await;
        body_text(response).await;
    }

    let response = get(&app, "/api/history").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let history = json["history"].as_array().unwrap();

    assert_eq!(history.len(), 20);
    assert_eq!(history[0]["user_message"], "message 25");
    assert_eq!(history[19]["user_message"], "message 6");
    for entry in history {
        assert_eq!(entry["ai_response"], "reply");
        assert_eq!(entry["model"], "gemini");
        let timestamp = entry["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(entry.get("id").is_none());
    }
}

#[tokio::test]
async fn client_disconnect_still_records_full_reply() {
    let fragments: Vec<String> = (0..200).map(|n| format!("f{} ", n)).collect();
    let app = build_test_app(FakeCompletionProvider::with_fragments(&fragments)).await;

    let response = post_chat(&app, r#"{"user_message": "hi"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body().into_data_stream();
    let first = body.next().await.unwrap().unwrap();
    assert_eq!(&first[..], b"f0 ");
    drop(body);

    let mut stored = app.stored();
    for _ in 0..100 {
        if !stored.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        stored = app.stored();
    }

    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_message, "hi");
    assert_eq!(stored[0].ai_response, fragments.concat());
}

struct FailingExchangeRepository;

fn disk_error() -> Error {
    Error::Database(DatabaseError::QueryFailed("disk I/O error".to_string()))
}

#[async_trait]
impl ExchangeRepositoryTrait for FailingExchangeRepository {
    async fn append(&self, _new_exchange: NewExchange) -> parley_core::Result<Exchange> {
        Err(disk_error())
    }

    fn recent(&self, _limit: i64) -> parley_core::Result<Vec<Exchange>> {
        Err(disk_error())
    }
}

#[tokio::test]
async fn history_store_failure_is_a_server_error() {
    let state = Arc::new(AppState {
        exchange_service: Arc::new(ExchangeService::new(Arc::new(FailingExchangeRepository))),
        completion_gateway: CompletionGateway::new(Arc::new(
            FakeCompletionProvider::with_fragments(&["unused"]),
        )),
    });
    let router = app_router(state, &test_config(Path::new("unused.db")));

    let response = router
        .oneshot(Request::builder().uri("/api/history").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("disk I/O error"));
}
