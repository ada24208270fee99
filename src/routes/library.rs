//! Personal library endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;

use crate::AppState;
use crate::models::VideoItem;

use super::require_session;
use crate::routes::auth::AuthUser;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/library", get(list_library))
        .route("/library/{id}/download", get(download))
}

/// GET /library - this session's items, productions first
async fn list_library(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<VideoItem>>, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    let guard = session.read().await;
    Ok(Json(guard.library.clone()))
}

/// GET /library/{id}/download - library entries are owned by definition
async fn download(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Response, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    let guard = session.read().await;
    let item = guard
        .library
        .iter()
        .find(|v| v.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    let url = item.video_url.as_deref().ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(serde_json::json!({ "url": url })).into_response())
}
