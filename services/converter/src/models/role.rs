//! Role model and related functionality

use sqlx::FromRow;

/// Name of the role allowed through admin-only routes
pub const ADMIN_ROLE: &str = "admin";

/// Name of the role handed to ordinary users
pub const USER_ROLE: &str = "user";

/// Roles seeded at startup
pub const DEFAULT_ROLES: [&str; 2] = [USER_ROLE, ADMIN_ROLE];

/// Role entity
///
/// `permissions` is an open-ended document; authorization only ever looks
/// at `name`.
#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub permissions: serde_json::Value,
}

/// Row to insert into the `roles` table
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub permissions: serde_json::Value,
}

impl NewRole {
    /// A role with an empty permission document
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: empty_permissions(),
        }
    }
}

fn empty_permissions() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
