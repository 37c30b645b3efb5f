//! Authentication handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::services::AuthResponse;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Desired username (letters, numbers and underscores)
    #[validate(
        length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"),
        custom(function = "validate_username_charset")
    )]
    #[schema(example = "ada_l")]
    pub username: String,
    /// User email address
    #[validate(email(message = "Please provide a valid email address"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[validate(email(message = "Please provide a valid email address"))]
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User password
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    /// Possibly-expired JWT issued by this service
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

fn validate_username_charset(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_charset");
        err.message = Some("Username can only contain letters, numbers, and underscores".into());
        Err(err)
    }
}

/// Create authentication routes
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route(
            "/profile",
            get(profile).route_layer(axum::middleware::from_fn_with_state(
                state,
                crate::api::middleware::auth_middleware,
            )),
        )
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Validation error or duplicate username/email")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = state
        .auth_service
        .register(payload.username, payload.email, payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login and get a token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation error or invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(response))
}

/// Exchange a possibly-expired token for a fresh one
#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    tag = "Authentication",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed", body = AuthResponse),
        (status = 401, description = "Signature invalid or user no longer exists")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshTokenRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state.auth_service.refresh_token(&payload.token).await?;

    Ok(Json(response))
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.auth_service.profile(current_user.id).await?;

    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_charset() {
        assert!(validate_username_charset("ada_l0velace").is_ok());
        assert!(validate_username_charset("bad name").is_err());
        assert!(validate_username_charset("bad-name").is_err());
        assert!(validate_username_charset("nameé").is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "ada_l".to_string(),
            email: "ada@example.com".to_string(),
            password: "longenough".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            username: "ada_l".to_string(),
            email: "not-an-email".to_string(),
            password: "longenough".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            username: "ada_l".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short_password.validate().is_err());
    }
}
