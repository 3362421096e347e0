//! Cookie transport for access and refresh tokens
//!
//! Each token type travels in its own cookie. Which cookie a request must
//! present is decided by its path alone, see [`token_type_for_path`].

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::jwt::TokenType;

/// Cookie carrying the access token
pub const ACCESS_COOKIE: &str = "access_token";

/// Cookie carrying the refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Path suffixes of the endpoints that authenticate with the refresh token
const REFRESH_PATH_SUFFIXES: [&str; 3] = ["/refresh", "/access-token", "/logout"];

/// Token type a request to `path` has to authenticate with
pub fn token_type_for_path(path: &str) -> TokenType {
    if REFRESH_PATH_SUFFIXES
        .iter()
        .any(|suffix| path.ends_with(suffix))
    {
        TokenType::Refresh
    } else {
        TokenType::Access
    }
}

/// Name of the cookie carrying tokens of the given type
pub fn cookie_name(token_type: TokenType) -> &'static str {
    match token_type {
        TokenType::Access => ACCESS_COOKIE,
        TokenType::Refresh => REFRESH_COOKIE,
    }
}

fn same_site(token_type: TokenType) -> SameSite {
    match token_type {
        TokenType::Access => SameSite::Lax,
        TokenType::Refresh => SameSite::Strict,
    }
}

fn base_cookie(token_type: TokenType, value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((cookie_name(token_type), value))
        .path("/")
        .max_age(max_age)
        .secure(true)
        .http_only(true)
        .same_site(same_site(token_type))
        .build()
}

/// Cookie delivering `token` to the client for `max_age_secs` seconds
pub fn token_cookie(token_type: TokenType, token: String, max_age_secs: u64) -> Cookie<'static> {
    let max_age = Duration::seconds(i64::try_from(max_age_secs).unwrap_or(i64::MAX));
    base_cookie(token_type, token, max_age)
}

/// Cookie that makes the client drop its token of the given type
pub fn removal_cookie(token_type: TokenType) -> Cookie<'static> {
    base_cookie(token_type, String::new(), Duration::ZERO)
}

/// Token of the given type sent with the request, if any
pub fn read_token(jar: &CookieJar, token_type: TokenType) -> Option<String> {
    jar.get(cookie_name(token_type))
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}
