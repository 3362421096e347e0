//! Converter service routes

use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::AppState;

pub mod auth;
pub mod pages;

/// Create the router for the converter service
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(pages::index).post(pages::convert))
        .route("/protected-user", get(pages::protected_user))
        .route("/protected-admin", get(pages::protected_admin))
        .route("/convert-for-user", post(pages::convert_for_user))
        .route("/convert-for-admin", post(pages::convert_for_admin))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_tokens))
        .route("/auth/access-token", post(auth::access_token))
        .route("/auth/logout", post(auth::logout))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for browser clients on the configured origins
///
/// Credentials are allowed, so origins must be listed explicitly.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::DELETE,
            Method::PATCH,
            Method::PUT,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::SET_COOKIE,
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            header::AUTHORIZATION,
        ])
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "converter"
    }))
}
