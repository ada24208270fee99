//! Credit store endpoints: balance, packages, purchases

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
use crate::domain::packages;
use crate::models::CreditPackage;
use crate::services::error::LogErr;
use crate::services::ledger;

use super::require_session;
use crate::routes::auth::AuthUser;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/credits", get(get_balance))
        .route("/credits/refresh", post(refresh_balance))
        .route("/credits/packages", get(list_packages))
        .route("/credits/packages/{id}/order", post(order_package))
        .route("/session/view", post(switch_view))
}

/// GET /credits - the session's mirrored balance, no store round trip
async fn get_balance(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    let balance = session.read().await.ledger.balance();
    Ok(Json(serde_json::json!({ "credits": balance })).into_response())
}

/// POST /credits/refresh - re-read the authoritative balance.
/// The client calls this on view switches as a fallback for missed pushes.
async fn refresh_balance(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    let mut guard = session.write().await;
    let balance = ledger::refresh(&state.db, &mut guard.ledger)
        .await
        .log_500("Balance refresh error")?;
    Ok(Json(serde_json::json!({ "credits": balance })).into_response())
}

/// GET /credits/packages - store offerings, cheapest first
async fn list_packages(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<CreditPackage>>, StatusCode> {
    require_session(&state, &user_id).await?;
    let list = packages::list(&state.db)
        .await
        .log_500("Package listing error")?;
    Ok(Json(list))
}

#[derive(Debug, Deserialize)]
struct SwitchViewRequest {
    view: String,
}

/// POST /session/view - the client reports a view switch; any switch away
/// from the auth view re-syncs the balance as a fallback for missed pushes
async fn switch_view(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<SwitchViewRequest>,
) -> Result<Response, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    if req.view == "auth" {
        let balance = session.read().await.ledger.balance();
        return Ok(Json(serde_json::json!({ "credits": balance })).into_response());
    }
    let mut guard = session.write().await;
    let balance = ledger::refresh(&state.db, &mut guard.ledger)
        .await
        .log_500("Balance refresh error")?;
    Ok(Json(serde_json::json!({ "credits": balance })).into_response())
}

#[derive(Debug, Deserialize)]
struct OrderPackageRequest {
    #[serde(default = "default_quantity")]
    quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// POST /credits/packages/{id}/order - request a charge from the payment
/// processor.
///
/// The response carries the payable code; no credits move here. The
/// processor settles asynchronously and the new balance arrives over the
/// credit feed.
async fn order_package(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(package_id): Path<String>,
    Json(req): Json<OrderPackageRequest>,
) -> Result<Response, StatusCode> {
    if req.quantity < 1 {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let session = require_session(&state, &user_id).await?;
    let profile = session.read().await.profile.clone();

    let package = packages::get(&state.db, &package_id)
        .await
        .log_500("Package fetch error")?
        .ok_or(StatusCode::NOT_FOUND)?;

    match state.payment.charge(&profile, &package, req.quantity).await {
        Ok(payment) => Ok(Json(payment).into_response()),
        Err(e) => {
            eprintln!("Payment charge failed for {}: {}", user_id, e);
            Ok((
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": "payment_unavailable" })),
            )
                .into_response())
        }
    }
}
