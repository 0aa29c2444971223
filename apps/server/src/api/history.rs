use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use parley_core::constants::DEFAULT_HISTORY_LIMIT;
use tokio::task;

use crate::{
    error::ApiResult,
    main_lib::AppState,
    models::{HistoryEntry, HistoryResponse},
};

/// Most recent exchanges, newest first.
async fn get_history(State(state): State<Arc<AppState>>) -> ApiResult<Json<HistoryResponse>> {
    let exchange_service = state.exchange_service.clone();
    let exchanges =
        task::spawn_blocking(move || exchange_service.recent_exchanges(DEFAULT_HISTORY_LIMIT))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to execute history query: {}", e))??;
    Ok(Json(HistoryResponse {
        history: exchanges.into_iter().map(HistoryEntry::from).collect(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/history", get(get_history))
}
