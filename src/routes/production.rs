//! Video production endpoint
//!
//! Debits first, then notifies the generator, then registers the placeholder
//! at the head of the library. Webhook delivery is optimistic; only the
//! debit can reject the request.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::constants::{COST_PRIVATE, COST_PUBLIC};
use crate::models::VideoCategory;
use crate::services::ledger::{self, SpendError};

use super::{insufficient_credits_response, require_session};
use crate::routes::auth::AuthUser;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/production", post(request_production))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductionRequest {
    prompt: String,
    category: VideoCategory,
    /// Required: visibility decides the price, so it is never defaulted
    is_public: bool,
}

/// POST /production
async fn request_production(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<ProductionRequest>,
) -> Result<Response, StatusCode> {
    let prompt = req.prompt.trim();
    if prompt.is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let session = require_session(&state, &user_id).await?;
    let cost = if req.is_public { COST_PUBLIC } else { COST_PRIVATE };

    let mut guard = session.write().await;
    match ledger::spend(&state.db, &mut guard.ledger, cost).await {
        Ok(_) => {}
        Err(SpendError::Insufficient(e)) => return Ok(insufficient_credits_response(&e)),
        Err(SpendError::Database(e)) => {
            eprintln!("Spend error during production: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    // Accepted regardless of delivery; see ProductionClient
    state
        .production
        .request_production(prompt, req.category, &user_id, req.is_public)
        .await;

    let item = guard.register_production(prompt, req.category, req.is_public);
    Ok((StatusCode::ACCEPTED, Json(item)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_uses_camel_case_visibility() {
        let req: ProductionRequest = serde_json::from_str(
            r#"{"prompt":"um céu estrelado","category":"timelapse","isPublic":false}"#,
        )
        .expect("deserialize");
        assert!(!req.is_public, "isPublic:false must select the private path");
    }

    #[test]
    fn test_missing_visibility_is_rejected() {
        // Visibility selects the price; a body without it must not parse
        let result = serde_json::from_str::<ProductionRequest>(
            r#"{"prompt":"um céu estrelado","category":"timelapse"}"#,
        );
        assert!(result.is_err());
    }
}
