use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::shortener::Shortener;

use super::handlers::{decode_url, encode_url, health_check, invalid_endpoint, AppState};

pub fn create_api_router(shortener: Arc<Shortener>) -> Router {
    let state = Arc::new(AppState { shortener });

    Router::new()
        .route("/health", get(health_check))
        .route("/encode", post(encode_url))
        .route("/decode", post(decode_url))
        .fallback(invalid_endpoint)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
