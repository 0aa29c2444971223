//! Chat streaming endpoint.
//!
//! Relays the user's message to the completion gateway and streams the reply
//! back as chunked plain text. Every accepted request is logged to the
//! exchange store exactly once, after the reply stream has ended.

use std::{convert::Infallible, sync::Arc};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::Response,
    routing::post,
    Router,
};
use futures::StreamExt;
use parley_ai::FragmentStream;
use parley_core::exchanges::ExchangeServiceTrait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::ChatRequest,
};

const FRAGMENT_CHANNEL_CAPACITY: usize = 32;

/// POST /api/chat
async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Response> {
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Internal(format!("Invalid request body: {}", e)))?;

    let user_message = request.trimmed_message().to_string();
    if user_message.is_empty() {
        return Err(ApiError::BadRequest("User message is required".to_string()));
    }
    let model = request.model_label();

    let fragments = state.completion_gateway.generate(&user_message).await?;

    let (tx, rx) = mpsc::channel::<Result<String, Infallible>>(FRAGMENT_CHANNEL_CAPACITY);
    tokio::spawn(relay_and_record(
        fragments,
        tx,
        state.exchange_service.clone(),
        user_message,
        model,
    ));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(ReceiverStream::new(rx)))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Forwards fragments to the response body while accumulating them, then
/// records the exchange once the fragment stream has ended.
///
/// The upstream stream is drained even after the client disconnects, so the
/// exchange is always recorded with everything the model produced. The body
/// closes only after the record is written.
async fn relay_and_record(
    mut fragments: FragmentStream,
    tx: mpsc::Sender<Result<String, Infallible>>,
    exchange_service: Arc<dyn ExchangeServiceTrait + Send + Sync>,
    user_message: String,
    model: String,
) {
    let mut full_reply = String::new();
    let mut client_connected = true;

    while let Some(fragment) = fragments.next().await {
        full_reply.push_str(&fragment);
        if client_connected && tx.send(Ok(fragment)).await.is_err() {
            tracing::info!("Client disconnected mid-stream; draining upstream before recording");
            client_connected = false;
        }
    }

    match exchange_service
        .record_exchange(user_message, full_reply, model)
        .await
    {
        Ok(exchange) => tracing::debug!("Recorded exchange {}", exchange.id),
        Err(e) => tracing::error!("Failed to record exchange: {}", e),
    }

    drop(tx);
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}
