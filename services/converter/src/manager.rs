//! User manager: registration and credential authentication

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::models::{LoginCredentials, NewUser, User, UserCreate};
use crate::repositories::{DuplicateEmail, UserStore};
use crate::validation::{validate_email, validate_password, validate_username};

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("REGISTER_USER_ALREADY_EXISTS")]
    UserAlreadyExists,

    #[error("REGISTER_INVALID_ROLE")]
    InvalidRole,

    #[error("REGISTER_INVALID_PASSWORD: {0}")]
    InvalidPassword(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Hash a password into a PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Check a password against a PHC string; malformed hashes never match
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// User manager
#[derive(Clone)]
pub struct UserManager {
    store: Arc<dyn UserStore>,
}

impl UserManager {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Register a new account
    pub async fn register(&self, payload: &UserCreate) -> Result<User, ManagerError> {
        validate_email(&payload.email).map_err(ManagerError::Validation)?;
        validate_username(&payload.username).map_err(ManagerError::Validation)?;
        validate_password(&payload.password, &payload.email)
            .map_err(ManagerError::InvalidPassword)?;

        if self.store.find_by_email(&payload.email).await?.is_some() {
            return Err(ManagerError::UserAlreadyExists);
        }

        if self.store.find_role(payload.role_id).await?.is_none() {
            return Err(ManagerError::InvalidRole);
        }

        let new_user = NewUser {
            email: payload.email.clone(),
            username: payload.username.clone(),
            hashed_password: hash_password(&payload.password)?,
            role_id: payload.role_id,
            is_active: true,
            is_superuser: false,
            is_verified: false,
        };

        // A concurrent registration may take the email after the lookup above
        let user = self.store.create(&new_user).await.map_err(|e| {
            if e.is::<DuplicateEmail>() {
                ManagerError::UserAlreadyExists
            } else {
                ManagerError::Store(e)
            }
        })?;
        info!("User {} has registered", user.id);

        Ok(user)
    }

    /// Resolve login credentials to a user
    ///
    /// Returns `None` for an unknown email or a wrong password. Whether the
    /// account is active is left to the caller.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Option<User>> {
        let Some(user) = self.store.find_by_email(&credentials.username).await? else {
            // Hash anyway so unknown emails take as long as wrong passwords
            hash_password(&credentials.password)?;
            return Ok(None);
        };

        if !verify_password(&credentials.password, &user.hashed_password) {
            return Ok(None);
        }

        Ok(Some(user))
    }
}
