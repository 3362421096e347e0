//! JWT service for token generation and validation
//!
//! Access and refresh tokens are signed with independent HMAC secrets and
//! carry their own lifetimes. Tokens are never stored server-side: a token
//! stays valid until its embedded expiry.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::models::User;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,
    /// Secret for signing refresh tokens
    pub refresh_secret: String,
    /// Signing algorithm, one of HS256, HS384 or HS512
    pub algorithm: String,
    /// Access token expiration time in seconds (default: 1 hour)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token for routine requests
    Access,
    /// Long-lived token used only to mint new tokens
    Refresh,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

impl Claims {
    /// The user id carried in `sub`
    pub fn user_id(&self) -> Result<i32, JwtError> {
        self.sub.parse().map_err(|_| JwtError::Invalid)
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("unsupported JWT algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token lifetime of {0} seconds is out of range")]
    InvalidLifetime(u64),

    #[error("failed to encode token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("token has expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("expected a {expected:?} token")]
    WrongType { expected: TokenType },
}

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    access: SigningKeys,
    refresh: SigningKeys,
    algorithm: Algorithm,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self, JwtError> {
        let algorithm = Algorithm::from_str(&config.algorithm)
            .map_err(|_| JwtError::UnsupportedAlgorithm(config.algorithm.clone()))?;

        // Secrets are shared keys, so only the HMAC family applies
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(JwtError::UnsupportedAlgorithm(config.algorithm.clone()));
        }

        for lifetime in [config.access_token_expiry, config.refresh_token_expiry] {
            i64::try_from(lifetime).map_err(|_| JwtError::InvalidLifetime(lifetime))?;
        }

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(JwtService {
            access: SigningKeys::from_secret(&config.access_secret),
            refresh: SigningKeys::from_secret(&config.refresh_secret),
            algorithm,
            validation,
            config,
        })
    }

    fn keys(&self, token_type: TokenType) -> &SigningKeys {
        match token_type {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    /// Lifetime in seconds of tokens of the given type
    pub fn lifetime(&self, token_type: TokenType) -> u64 {
        match token_type {
            TokenType::Access => self.config.access_token_expiry,
            TokenType::Refresh => self.config.refresh_token_expiry,
        }
    }

    /// Issue a token of the given type for a user
    pub fn issue(&self, token_type: TokenType, user: &User) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let lifetime = self.lifetime(token_type);
        let exp = i64::try_from(lifetime)
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or(JwtError::InvalidLifetime(lifetime))?;

        let claims = Claims {
            sub: user.id.to_string(),
            iat: now,
            exp,
            token_type,
        };

        self.encode(&claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(
            &Header::new(self.algorithm),
            claims,
            &self.keys(claims.token_type).encoding,
        )
        .map_err(JwtError::Encoding)
    }

    /// Validate a token of the expected type and return its claims
    pub fn validate(&self, token_type: TokenType, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.keys(token_type).decoding, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid,
            })?;

        if token_data.claims.token_type != token_type {
            return Err(JwtError::WrongType {
                expected: token_type,
            });
        }

        Ok(token_data.claims)
    }
}
