//! Authentication service - registration, login and token lifecycle.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR};
use crate::domain::{Password, User, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::Persistence;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Response returned after successful registration, login or refresh
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Signed JWT
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Token lifetime in seconds
    #[schema(example = 604800)]
    pub expires_in: i64,
    /// Public fields of the authenticated user
    pub user: UserResponse,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user and issue a token
    async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> AppResult<AuthResponse>;

    /// Login and issue a token
    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse>;

    /// Verify a token's signature and expiry, and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Resolve a verified token to the stored user
    async fn authenticate(&self, token: &str) -> AppResult<User>;

    /// Issue a fresh token from a possibly-expired one
    async fn refresh_token(&self, token: &str) -> AppResult<AuthResponse>;

    /// Fetch the profile of an authenticated user
    async fn profile(&self, user_id: Uuid) -> AppResult<User>;
}

/// Generate a signed token for a user (shared helper)
fn generate_token(user: &User, config: &Config) -> AppResult<(String, i64)> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok((token, config.jwt_expiration_hours * SECONDS_PER_HOUR))
}

/// Decode a token, classifying expiry and structural failures separately.
fn decode_token(token: &str, config: &Config, validate_exp: bool) -> AppResult<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = validate_exp;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService.
pub struct Authenticator<P: Persistence> {
    persistence: Arc<P>,
    config: Config,
}

impl<P: Persistence> Authenticator<P> {
    /// Create new auth service instance
    pub fn new(persistence: Arc<P>, config: Config) -> Self {
        Self {
            persistence,
            config,
        }
    }

    fn auth_response(&self, user: User) -> AppResult<AuthResponse> {
        let (token, expires_in) = generate_token(&user, &self.config)?;
        Ok(AuthResponse {
            token,
            expires_in,
            user: UserResponse::from(user),
        })
    }
}

#[async_trait]
impl<P: Persistence> AuthService for Authenticator<P> {
    async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> AppResult<AuthResponse> {
        let users = self.persistence.users();

        // Duplicate checks produce field-specific messages
        if users.find_by_email(&email).await?.is_some() {
            return Err(AppError::duplicate("Email already in use"));
        }
        if users.find_by_username(&username).await?.is_some() {
            return Err(AppError::duplicate("Username already taken"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = users.create(username, email, password_hash).await?;

        tracing::info!(user_id = %user.id, "User registered");

        self.auth_response(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthResponse> {
        let user_result = self.persistence.users().find_by_email(&email).await?;

        // SECURITY: Verify against a dummy hash when the user doesn't exist
        // so unknown-email and wrong-password take the same time.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let password_valid = Password::from_hash(password_hash.to_string()).verify(&password);

        // Single generic failure for both cases; never reveal which one failed
        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = user_result.expect("user_exists checked above");
        let user = self.persistence.users().touch_last_login(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        self.auth_response(user)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        decode_token(token, &self.config, true)
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;

        self.persistence
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserGone)
    }

    async fn refresh_token(&self, token: &str) -> AppResult<AuthResponse> {
        // Expiry is deliberately ignored; the signature is still checked
        let claims = decode_token(token, &self.config, false)?;

        let user = self
            .persistence
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserGone)?;

        self.auth_response(user)
    }

    async fn profile(&self, user_id: Uuid) -> AppResult<User> {
        self.persistence
            .users()
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserGone)
    }
}
