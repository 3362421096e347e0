//! Request authentication and role guards
//!
//! [`AuthUser`] resolves the current user from the cookie-borne token that
//! the request path calls for. [`AdminUser`] additionally requires the
//! `admin` role.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::{
    AppState,
    cookies::{read_token, token_type_for_path},
    error::AppError,
    models::{ADMIN_ROLE, Role, User},
};

/// Authenticated user together with their role
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub role: Role,
}

/// True iff the user's role is `admin`
pub fn is_admin(user: &AuthUser) -> bool {
    user.role.name == ADMIN_ROLE
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Nested routers strip their prefix from `parts.uri`
        let path = match parts.extensions.get::<OriginalUri>() {
            Some(OriginalUri(uri)) => uri.path().to_string(),
            None => parts.uri.path().to_string(),
        };
        let token_type = token_type_for_path(&path);

        let jar = CookieJar::from_headers(&parts.headers);
        let token = read_token(&jar, token_type).ok_or_else(|| {
            debug!("No {:?} token cookie on {}", token_type, path);
            AppError::Unauthorized
        })?;

        let claims = state
            .jwt_service
            .validate(token_type, &token)
            .map_err(|e| {
                debug!("Rejected {:?} token on {}: {}", token_type, path, e);
                AppError::Unauthorized
            })?;
        let user_id = claims.user_id().map_err(|_| AppError::Unauthorized)?;

        let user = state
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AppError::Unauthorized)?;

        let role = state.users.find_role(user.role_id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "user {} references missing role {}",
                user.id,
                user.role_id
            ))
        })?;

        Ok(AuthUser { user, role })
    }
}

/// Authenticated user holding the `admin` role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_admin(&user) {
            debug!("User {} is not an admin", user.user.id);
            return Err(AppError::Forbidden);
        }
        Ok(Self(user))
    }
}
