//! Cookie building utilities for session management
//!
//! Centralizes cookie formatting so login and logout stay consistent.

use axum::http::{HeaderValue, StatusCode};

/// Cookie configuration constants
pub mod config {
    /// Access token cookie name
    pub const ACCESS_TOKEN_NAME: &str = "access_token";
    /// Access token max-age in seconds (12 hours, matching the JWT expiry)
    pub const ACCESS_TOKEN_MAX_AGE_SECS: u32 = 12 * 60 * 60;
    /// Path for the access token cookie (all routes)
    pub const ACCESS_COOKIE_PATH: &str = "/";
}

fn is_dev() -> bool {
    std::env::var("ENV").as_deref() != Ok("prod")
}

fn cookie_same_site() -> &'static str {
    match std::env::var("COOKIE_SAMESITE")
        .unwrap_or_else(|_| "Lax".to_string())
        .to_lowercase()
        .as_str()
    {
        "none" => "None",
        "strict" => "Strict",
        _ => "Lax",
    }
}

/// Build an access token Set-Cookie header value
pub fn build_access_cookie(token: &str) -> Result<HeaderValue, StatusCode> {
    let same_site = cookie_same_site();
    let secure = if is_dev() { "" } else { " Secure;" };
    let cookie = format!(
        "{}={}; HttpOnly;{} SameSite={}; Path={}; Max-Age={}",
        config::ACCESS_TOKEN_NAME,
        token,
        secure,
        same_site,
        config::ACCESS_COOKIE_PATH,
        config::ACCESS_TOKEN_MAX_AGE_SECS
    );
    cookie.parse().map_err(|_| {
        eprintln!("Failed to parse access cookie header");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Build a Set-Cookie header that clears the access token
pub fn build_clear_access_cookie() -> HeaderValue {
    format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path={}; Max-Age=0",
        config::ACCESS_TOKEN_NAME,
        config::ACCESS_COOKIE_PATH
    )
    .parse()
    .expect("static cookie string should always parse")
}
