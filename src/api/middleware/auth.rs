//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, LEGACY_TOKEN_HEADER};
use crate::errors::AppError;

/// Authenticated user extracted from the verified JWT
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Pull the token out of `Authorization: Bearer ...`, falling back to the
/// legacy `x-auth-token` header older clients still send.
fn extract_token(request: &Request) -> Option<&str> {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX));

    bearer.or_else(|| {
        request
            .headers()
            .get(LEGACY_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
    })
}

/// JWT authentication middleware.
///
/// Verifies the token, re-checks the user still exists, and injects a
/// `CurrentUser` into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request).ok_or(AppError::Unauthorized)?;

    let user = state.auth_service.authenticate(token).await?;

    let current_user = CurrentUser {
        id: user.id,
        username: user.username,
        email: user.email,
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
