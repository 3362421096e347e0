//! Shared fixtures for the route tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use converter::{
    AppState, create_router,
    cookies::cookie_name,
    currency::{CurrencyApiConfig, CurrencyClient},
    jwt::{JwtConfig, JwtService, TokenType},
    manager::hash_password,
    models::{NewUser, Role, User},
    repositories::{DuplicateEmail, UserStore},
    routes::pages::load_templates,
};

pub const USER_ROLE_ID: i32 = 1;
pub const ADMIN_ROLE_ID: i32 = 2;
pub const PASSWORD: &str = "correct-horse";

/// Credential store kept in memory
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
    roles: Vec<Role>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        let role = |id: i32, name: &str| Role {
            id,
            name: name.to_string(),
            permissions: serde_json::json!({}),
        };

        Self {
            users: Mutex::new(Vec::new()),
            roles: vec![role(USER_ROLE_ID, "user"), role(ADMIN_ROLE_ID, "admin")],
        }
    }

    pub fn set_active(&self, user_id: i32, is_active: bool) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|user| user.id == user_id) {
            user.is_active = is_active;
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: &NewUser) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|user| user.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(DuplicateEmail.into());
        }
        let user = User {
            id: users.len() as i32 + 1,
            email: new_user.email.clone(),
            username: new_user.username.clone(),
            hashed_password: new_user.hashed_password.clone(),
            role_id: new_user.role_id,
            is_active: new_user.is_active,
            is_superuser: new_user.is_superuser,
            is_verified: new_user.is_verified,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_role(&self, role_id: i32) -> Result<Option<Role>> {
        Ok(self.roles.iter().find(|role| role.id == role_id).cloned())
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: "route-test-access-secret".to_string(),
        refresh_secret: "route-test-refresh-secret".to_string(),
        algorithm: "HS256".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
    }
}

/// Router plus handles on its collaborators
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryUserStore>,
    pub jwt: JwtService,
}

impl TestApp {
    /// App whose currency client talks to `currency_url`
    pub fn new(currency_url: &str) -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let jwt = JwtService::new(jwt_config()).unwrap();
        let currency_client = CurrencyClient::new(CurrencyApiConfig {
            url: currency_url.to_string(),
            api_key: "test-key".to_string(),
        })
        .unwrap();
        let templates =
            load_templates(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*.html")).unwrap();

        let state = AppState::new(store.clone(), jwt.clone(), currency_client, templates);
        let router = create_router(state, &["http://localhost:3000".to_string()]);

        Self { router, store, jwt }
    }

    /// App whose currency API is unreachable
    pub fn offline() -> Self {
        Self::new("http://127.0.0.1:1/currency_data/convert")
    }

    /// Store a user with the shared test password
    pub async fn seed_user(&self, email: &str, role_id: i32) -> User {
        let username = email.split('@').next().unwrap_or("user").to_string();
        self.store
            .create(&NewUser {
                email: email.to_string(),
                username,
                hashed_password: hash_password(PASSWORD).unwrap(),
                role_id,
                is_active: true,
                is_superuser: false,
                is_verified: false,
            })
            .await
            .unwrap()
    }

    /// `Cookie` header value carrying a fresh token of the given type
    pub fn cookie(&self, token_type: TokenType, user: &User) -> String {
        let token = self.jwt.issue(token_type, user).unwrap();
        format!("{}={}", cookie_name(token_type), token)
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// All `Set-Cookie` headers of a response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// The `Set-Cookie` header for the named cookie, if any
pub fn set_cookie_for(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response)
        .into_iter()
        .find(|cookie| cookie.starts_with(&prefix))
}

/// `name=value` part of a `Set-Cookie` header, ready for a `Cookie` header
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_string()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
