//! Repositories for database operations

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewUser, Role, User};

pub mod user;

pub use user::UserRepository;

/// Returned by [`UserStore::create`] when the email is already taken
#[derive(Debug, Error)]
#[error("a user with this email already exists")]
pub struct DuplicateEmail;

/// Credential store: users and the roles they reference
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user; the password must already be hashed
    ///
    /// Fails with [`DuplicateEmail`] when the email is taken.
    async fn create(&self, new_user: &NewUser) -> Result<User>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<User>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Find a role by ID
    async fn find_role(&self, role_id: i32) -> Result<Option<Role>>;
}
