//! Converter service models

pub mod role;
pub mod user;

// Re-export for convenience
pub use role::{ADMIN_ROLE, DEFAULT_ROLES, NewRole, Role, USER_ROLE};
pub use user::{LoginCredentials, NewUser, User, UserCreate};
