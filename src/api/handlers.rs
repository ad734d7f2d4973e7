use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::models::{DecodeResponse, EncodeResponse, UrlRequest};
use crate::shortener::{Shortener, ShortenerError};

pub struct AppState {
    pub shortener: Arc<Shortener>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn shortener_error(err: ShortenerError) -> ApiError {
    match err {
        ShortenerError::InvalidUrl => error_response(StatusCode::BAD_REQUEST, err.to_string()),
        ShortenerError::NotFound => error_response(StatusCode::NOT_FOUND, err.to_string()),
        ShortenerError::Storage(e) => {
            tracing::error!(error = %e, "storage failure");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage failure: {}", e),
            )
        }
    }
}

/// Pull a non-empty `url` out of the body. Unparseable bodies count as empty.
fn required_url(
    payload: Result<Json<UrlRequest>, JsonRejection>,
    missing: &str,
) -> Result<String, ApiError> {
    match payload {
        Ok(Json(request)) if !request.url.is_empty() => Ok(request.url),
        _ => Err(error_response(StatusCode::BAD_REQUEST, missing)),
    }
}

/// Shorten a long URL
pub async fn encode_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<EncodeResponse>, ApiError> {
    let long_url = required_url(payload, "URL is required")?;

    match state.shortener.encode(&long_url).await {
        Ok(short_url) => Ok(Json(EncodeResponse { short_url })),
        Err(e) => Err(shortener_error(e)),
    }
}

/// Resolve a short URL back to the original
pub async fn decode_url(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<DecodeResponse>, ApiError> {
    let short_url = required_url(payload, "Short URL is required")?;

    match state.shortener.decode(&short_url).await {
        Ok(long_url) => Ok(Json(DecodeResponse { long_url })),
        Err(e) => Err(shortener_error(e)),
    }
}

pub async fn invalid_endpoint() -> ApiError {
    error_response(StatusCode::NOT_FOUND, "Invalid endpoint")
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
