mod constants;
mod domain;
mod models;
mod routes;
mod services;
mod session;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use services::payment::PaymentClient;
use services::production::ProductionClient;
use session::SessionStore;

const DEFAULT_PAYMENT_WEBHOOK: &str =
    "https://n8n-n8n.6wqa93.easypanel.host/webhook/pgtosite";
const DEFAULT_PRODUCTION_WEBHOOK: &str =
    "https://n8n-n8n.6wqa93.easypanel.host/webhook/video-production";

pub struct AppState {
    db: PgPool,
    sessions: SessionStore,
    payment: PaymentClient,
    production: ProductionClient,
    jwt_secret: Vec<u8>,
    require_email_confirmation: bool,
}

async fn health() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let jwt_secret = std::env::var("JWT_SECRET")
        .expect("JWT_SECRET must be set")
        .into_bytes();

    let payment_webhook = std::env::var("PAYMENT_WEBHOOK_URL")
        .unwrap_or_else(|_| DEFAULT_PAYMENT_WEBHOOK.to_string());
    let production_webhook = std::env::var("PRODUCTION_WEBHOOK_URL")
        .unwrap_or_else(|_| DEFAULT_PRODUCTION_WEBHOOK.to_string());

    let require_email_confirmation = std::env::var("REQUIRE_EMAIL_CONFIRMATION")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let state = Arc::new(AppState {
        db: pool,
        sessions: SessionStore::new(),
        payment: PaymentClient::new(&payment_webhook),
        production: ProductionClient::new(&production_webhook),
        jwt_secret,
        require_email_confirmation,
    });

    // Cookie auth requires credentials, so the allowed origin must be exact
    let frontend_origin =
        std::env::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());
    let cors = CorsLayer::new()
        .allow_origin(
            frontend_origin
                .parse::<HeaderValue>()
                .expect("FRONTEND_ORIGIN must be a valid origin"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let app = Router::new()
        .route("/health", get(health))
        .merge(routes::build_routes())
        .layer(cors)
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {}: {}", addr, e));

    println!("Listening on http://{}", addr);
    axum::serve(listener, app).await.expect("Server failed");
}
