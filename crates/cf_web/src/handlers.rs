use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cf_core::Article;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub source: String,
    pub news: Vec<Article>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures surfaced to HTTP callers. Details stay in the server log.
#[derive(Debug)]
pub enum ApiError {
    LoadNews,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::LoadNews => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load news"),
        };
        (status, Json(ErrorResponse { error: message.to_string() })).into_response()
    }
}

pub async fn list_news(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NewsResponse>, ApiError> {
    let news = state.storage.list_with_images().await.map_err(|e| {
        error!(error = %e, "Error loading news from storage");
        ApiError::LoadNews
    })?;

    Ok(Json(NewsResponse {
        source: state.storage.name().to_string(),
        news,
    }))
}

pub async fn health() -> &'static str {
    "ok"
}
