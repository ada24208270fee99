//! Scheduling registry endpoints (premium tier only)
//!
//! This is a registry, not an executor. Entries are created `Pending` and
//! stay there; no dispatcher ever posts them to a platform.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::models::{Platform, ScheduledPost};
use crate::session::ScheduleError;

use super::require_session;
use crate::routes::auth::AuthUser;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/schedule", get(list_posts).post(create_post))
        .route("/schedule/{id}", delete(remove_post))
}

/// GET /schedule - newest first
async fn list_posts(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ScheduledPost>>, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    let guard = session.read().await;
    Ok(Json(guard.scheduled_posts.clone()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchedulePostRequest {
    video_id: String,
    platform: Platform,
    scheduled_at: DateTime<Utc>,
    #[serde(default)]
    caption: String,
}

/// POST /schedule
async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<SchedulePostRequest>,
) -> Result<Response, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    let mut guard = session.write().await;

    match guard.schedule_post(
        &req.video_id,
        req.platform,
        req.scheduled_at,
        &req.caption,
        Utc::now(),
    ) {
        Ok(post) => Ok((StatusCode::CREATED, Json(post)).into_response()),
        Err(ScheduleError::PremiumRequired) => Ok((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "premium_required" })),
        )
            .into_response()),
        Err(ScheduleError::UnknownVideo) => Err(StatusCode::NOT_FOUND),
        Err(ScheduleError::PastTimestamp) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "past_timestamp" })),
        )
            .into_response()),
    }
}

/// DELETE /schedule/{id}
async fn remove_post(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    let mut guard = session.write().await;
    if guard.remove_scheduled(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_uses_camel_case_wire_names() {
        let req: SchedulePostRequest = serde_json::from_str(
            r#"{"videoId":"p-001","platform":"tiktok","scheduledAt":"2026-09-01T12:00:00Z","caption":"legenda"}"#,
        )
        .expect("deserialize");
        assert_eq!(req.video_id, "p-001");
        assert_eq!(req.platform, Platform::Tiktok);
        assert_eq!(req.caption, "legenda");
    }

    #[test]
    fn test_caption_defaults_empty() {
        let req: SchedulePostRequest = serde_json::from_str(
            r#"{"videoId":"p-001","platform":"youtube","scheduledAt":"2026-09-01T12:00:00Z"}"#,
        )
        .expect("deserialize");
        assert_eq!(req.caption, "");
    }
}
