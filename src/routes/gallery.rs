//! Shared gallery endpoints: browse, purchase, download

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::domain::videos;
use crate::models::{LicenseKind, VideoItem};
use crate::services::error::LogErr;
use crate::services::ledger::{self, SpendError};
use crate::session::{PurchaseError, license_checkout};

use super::{insufficient_credits_response, require_session};
use crate::routes::auth::AuthUser;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/gallery", get(list_gallery))
        .route("/gallery/{id}", get(get_item))
        .route("/gallery/{id}/purchase", post(purchase))
        .route("/gallery/{id}/download", get(download))
}

/// GET /gallery - the shared catalog, newest first
async fn list_gallery(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<VideoItem>>, StatusCode> {
    require_session(&state, &user_id).await?;
    let items = videos::list_catalog(&state.db)
        .await
        .log_500("Gallery listing error")?;
    Ok(Json(items))
}

/// GET /gallery/{id}
async fn get_item(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<VideoItem>, StatusCode> {
    require_session(&state, &user_id).await?;
    let item = videos::get(&state.db, &id)
        .await
        .log_500("Gallery fetch error")?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(item))
}

#[derive(Debug, Deserialize)]
struct PurchaseRequest {
    license: LicenseKind,
}

fn exclusive_sold_response() -> Response {
    (
        StatusCode::CONFLICT,
        Json(serde_json::json!({ "error": "exclusive_sold" })),
    )
        .into_response()
}

/// POST /gallery/{id}/purchase
///
/// Demo sessions settle against the local ledger only. Persisted sessions
/// spend through the store first, then register the copy; flipping the
/// catalog row's sold flag is best effort since the copy already exists.
async fn purchase(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<PurchaseRequest>,
) -> Result<Response, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    let item = videos::get(&state.db, &id)
        .await
        .log_500("Gallery fetch error")?
        .ok_or(StatusCode::NOT_FOUND)?;

    let mut guard = session.write().await;

    if guard.is_demo() {
        return match guard.purchase_local(&item, req.license) {
            Ok(copy) => Ok((StatusCode::CREATED, Json(copy)).into_response()),
            Err(PurchaseError::ExclusiveSold) => Ok(exclusive_sold_response()),
            Err(PurchaseError::Insufficient(e)) => Ok(insufficient_credits_response(&e)),
        };
    }

    let cost = match license_checkout(&item, req.license) {
        Ok(cost) => cost,
        Err(PurchaseError::ExclusiveSold) => return Ok(exclusive_sold_response()),
        Err(PurchaseError::Insufficient(e)) => return Ok(insufficient_credits_response(&e)),
    };

    match ledger::spend(&state.db, &mut guard.ledger, cost).await {
        Ok(_) => {}
        Err(SpendError::Insufficient(e)) => return Ok(insufficient_credits_response(&e)),
        Err(SpendError::Database(e)) => {
            eprintln!("Spend error during purchase: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let copy = guard.add_purchased_copy(&item);

    if req.license == LicenseKind::Exclusive {
        // The buyer already paid; a failed flag write only risks a second
        // exclusive sale, which the next purchase's checkout re-checks
        if let Err(e) = videos::mark_exclusive_sold(&state.db, &item.id).await {
            eprintln!("Failed to mark exclusive sold for {}: {}", item.id, e);
        }
    }

    Ok((StatusCode::CREATED, Json(copy)).into_response())
}

/// GET /gallery/{id}/download - hands back the media URL if viewable
async fn download(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Response, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    let item = videos::get(&state.db, &id)
        .await
        .log_500("Gallery fetch error")?
        .ok_or(StatusCode::NOT_FOUND)?;

    let guard = session.read().await;
    if !guard.can_download(&item) {
        return Ok((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "not_owned" })),
        )
            .into_response());
    }

    let url = item.video_url.ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(serde_json::json!({ "url": url })).into_response())
}
