//! Profile detail endpoints

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::patch,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use crate::domain::profiles::{self, ProfileUpdate};
use crate::services::error::LogErr;

use super::require_session;
use crate::routes::auth::AuthUser;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/me", patch(update_profile))
}

#[derive(Debug, Deserialize)]
struct UpdateProfileRequest {
    display_name: Option<String>,
    phone: Option<String>,
    #[serde(rename = "taxId")]
    tax_id: Option<String>,
    avatar_url: Option<String>,
}

/// PATCH /me - absent fields are left untouched.
/// Demo sessions update in memory only.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Response, StatusCode> {
    let session = require_session(&state, &user_id).await?;
    let mut guard = session.write().await;

    if !guard.is_demo() {
        let affected = profiles::update_details(
            &state.db,
            &user_id,
            ProfileUpdate {
                display_name: req.display_name.as_deref(),
                phone: req.phone.as_deref(),
                tax_id: req.tax_id.as_deref(),
                avatar_url: req.avatar_url.as_deref(),
            },
        )
        .await
        .log_500("Profile update error")?;
        if affected == 0 {
            return Err(StatusCode::NOT_FOUND);
        }
    }

    if let Some(name) = req.display_name {
        guard.profile.display_name = name;
    }
    if let Some(phone) = req.phone {
        guard.profile.phone = Some(phone);
    }
    if let Some(tax_id) = req.tax_id {
        guard.profile.tax_id = Some(tax_id);
    }
    if let Some(avatar) = req.avatar_url {
        guard.profile.avatar_url = Some(avatar);
    }

    let mut profile = guard.profile.clone();
    profile.credits = guard.ledger.balance();
    Ok(Json(profile).into_response())
}
