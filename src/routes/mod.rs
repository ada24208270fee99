pub mod auth;
pub mod credits;
pub mod gallery;
pub mod library;
pub mod production;
pub mod scheduler;
pub mod user;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tokio::sync::RwLock;

use crate::AppState;
use crate::services::ledger::InsufficientCredits;
use crate::session::Session;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(credits::routes())
        .merge(gallery::routes())
        .merge(library::routes())
        .merge(production::routes())
        .merge(scheduler::routes())
        .merge(user::routes())
}

/// Look up the live session for an authenticated user id.
/// A valid token without a session (server restart, logout elsewhere)
/// is still unauthorized.
pub(crate) async fn require_session(
    state: &AppState,
    user_id: &str,
) -> Result<Arc<RwLock<Session>>, StatusCode> {
    state
        .sessions
        .get(user_id)
        .await
        .ok_or(StatusCode::UNAUTHORIZED)
}

/// Standard insufficient-funds signal: 402 plus a pointer at the
/// credit-purchase flow
pub(crate) fn insufficient_credits_response(err: &InsufficientCredits) -> Response {
    (
        StatusCode::PAYMENT_REQUIRED,
        Json(serde_json::json!({
            "error": "insufficient_credits",
            "redirect": "buy-credits",
            "balance": err.balance,
            "required": err.required,
        })),
    )
        .into_response()
}
