//! Authentication routes: registration, cookie login and token renewal

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use tracing::{debug, info};

use crate::{
    AppState,
    cookies::{removal_cookie, token_cookie},
    error::{AppError, AppResult},
    jwt::TokenType,
    middleware::AuthUser,
    models::{LoginCredentials, User, UserCreate},
};

/// Add a freshly issued token of the given type to the jar
fn with_token(
    jar: CookieJar,
    state: &AppState,
    token_type: TokenType,
    user: &User,
) -> AppResult<CookieJar> {
    let token = state.jwt_service.issue(token_type, user)?;
    let lifetime = state.jwt_service.lifetime(token_type);
    Ok(jar.add(token_cookie(token_type, token, lifetime)))
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<impl IntoResponse> {
    info!("Registration attempt for {}", payload.email);

    let user = state.user_manager.register(&payload).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// User login endpoint
///
/// Expects a urlencoded form whose `username` field holds the email.
/// Sets both token cookies and answers with an empty body.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(credentials): Form<LoginCredentials>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .user_manager
        .authenticate(&credentials)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| {
            debug!("Bad credentials for {}", credentials.username);
            AppError::bad_request("LOGIN_BAD_CREDENTIALS")
        })?;

    let jar = with_token(jar, &state, TokenType::Access, &user)?;
    let jar = with_token(jar, &state, TokenType::Refresh, &user)?;

    info!("User {} logged in", user.id);
    Ok((StatusCode::NO_CONTENT, jar))
}

/// Replace both tokens; authenticates with the refresh token
pub async fn refresh_tokens(
    State(state): State<AppState>,
    current: AuthUser,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let jar = with_token(jar, &state, TokenType::Access, &current.user)?;
    let jar = with_token(jar, &state, TokenType::Refresh, &current.user)?;

    debug!("Tokens refreshed for user {}", current.user.id);
    Ok((
        jar,
        Json(json!({ "message": "Tokens have been updated successfully!" })),
    ))
}

/// Issue a new access token; authenticates with the refresh token
pub async fn access_token(
    State(state): State<AppState>,
    current: AuthUser,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let jar = with_token(jar, &state, TokenType::Access, &current.user)?;

    debug!("Access token renewed for user {}", current.user.id);
    Ok((
        jar,
        Json(json!({ "message": "Access token successfully updated!" })),
    ))
}

/// Clear both token cookies; authenticates with the refresh token
pub async fn logout(current: AuthUser, jar: CookieJar) -> impl IntoResponse {
    let jar = jar
        .add(removal_cookie(TokenType::Access))
        .add(removal_cookie(TokenType::Refresh));

    info!("User {} logged out", current.user.id);
    (jar, Json(json!({ "message": "Successfully logged out" })))
}
