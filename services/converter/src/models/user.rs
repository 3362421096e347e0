//! User model and related functionality

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User entity
///
/// Serializing a user never exposes the password hash, so the same struct
/// is used for API responses and template contexts.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role_id: i32,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

/// Row to insert into the `users` table
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub hashed_password: String,
    pub role_id: i32,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
}

/// Registration payload
///
/// The account flags are accepted for compatibility with existing clients
/// but ignored: new accounts are always active, unprivileged and unverified.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role_id: i32,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
    #[serde(default)]
    pub is_verified: Option<bool>,
}

/// Login form; `username` carries the account email
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}
