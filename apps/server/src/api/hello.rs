use std::sync::Arc;

use axum::{routing::get, Json, Router};

use crate::{main_lib::AppState, models::HelloResponse};

pub const HELLO_MESSAGE: &str = "Hello from Python backend!";

/// Fixed greeting used by the front end to confirm the backend is reachable.
async fn hello() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: HELLO_MESSAGE.to_string(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/hello", get(hello))
}
