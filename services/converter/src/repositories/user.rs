//! PostgreSQL-backed user repository

use anyhow::Result;
use async_trait::async_trait;
use common::database::Database;
use tracing::{debug, info};

use super::{DuplicateEmail, UserStore};
use crate::models::{NewUser, Role, User};

const USER_COLUMNS: &str =
    "id, email, username, hashed_password, role_id, is_active, is_superuser, is_verified";

/// User repository
///
/// Every call runs in its own database session.
#[derive(Clone)]
pub struct UserRepository {
    database: Database,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.email);

        let mut session = self.database.session().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, username, hashed_password, role_id, is_active, is_superuser, is_verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.hashed_password)
        .bind(new_user.role_id)
        .bind(new_user.is_active)
        .bind(new_user.is_superuser)
        .bind(new_user.is_verified)
        .fetch_one(&mut *session)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                anyhow::Error::new(DuplicateEmail)
            } else {
                e.into()
            }
        })?;
        session.close().await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        debug!("Finding user by ID: {}", id);

        let mut session = self.database.session().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *session)
        .await?;
        session.close().await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        debug!("Finding user by email: {}", email);

        let mut session = self.database.session().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&mut *session)
        .await?;
        session.close().await?;

        Ok(user)
    }

    async fn find_role(&self, role_id: i32) -> Result<Option<Role>> {
        let mut session = self.database.session().await?;
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, permissions FROM roles WHERE id = $1",
        )
        .bind(role_id)
        .fetch_optional(&mut *session)
        .await?;
        session.close().await?;

        Ok(role)
    }
}
