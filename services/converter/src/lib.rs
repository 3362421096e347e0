//! Currency converter web application
//!
//! Anonymous and authenticated currency conversion pages backed by a
//! third-party FX API. Authentication uses JWTs carried in two cookies:
//! a short-lived access token for ordinary pages and a long-lived refresh
//! token for the `/auth/*` token-management endpoints.

use std::sync::Arc;

use tera::Tera;

pub mod config;
pub mod cookies;
pub mod currency;
pub mod database;
pub mod error;
pub mod jwt;
pub mod manager;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod validation;

pub use routes::create_router;

use crate::{
    currency::CurrencyClient, jwt::JwtService, manager::UserManager, repositories::UserStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub user_manager: UserManager,
    pub jwt_service: JwtService,
    pub currency_client: CurrencyClient,
    pub templates: Arc<Tera>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        jwt_service: JwtService,
        currency_client: CurrencyClient,
        templates: Tera,
    ) -> Self {
        Self {
            user_manager: UserManager::new(users.clone()),
            users,
            jwt_service,
            currency_client,
            templates: Arc::new(templates),
        }
    }
}
