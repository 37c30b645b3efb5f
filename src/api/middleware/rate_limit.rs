//! Per-client request rate limiting middleware.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::net::SocketAddr;

use crate::api::AppState;
use crate::config::{
    RATE_LIMIT_AI_REQUESTS, RATE_LIMIT_AI_WINDOW_SECONDS, RATE_LIMIT_AUTH_REQUESTS,
    RATE_LIMIT_AUTH_WINDOW_SECONDS, RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW_SECONDS,
};

/// Rate limit error response
#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after: u64,
    pub code: &'static str,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Retry-After",
            HeaderValue::from_str(&self.retry_after.to_string()).unwrap(),
        );
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));

        let body = json!({
            "success": false,
            "message": "Too many requests, please try again later",
            "code": self.code,
        });

        (StatusCode::TOO_MANY_REQUESTS, headers, Json(body)).into_response()
    }
}

/// Extract client identifier for rate limiting.
/// Uses X-Forwarded-For header if behind proxy, otherwise uses connection IP.
fn get_client_identifier(request: &Request) -> String {
    // Try X-Forwarded-For header first (for reverse proxies)
    if let Some(forwarded) = request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
    {
        // Take the first IP in the chain (original client)
        if let Some(ip) = forwarded.split(',').next() {
            return ip.trim().to_string();
        }
    }

    // Try X-Real-IP header
    if let Some(real_ip) = request
        .headers()
        .get("X-Real-IP")
        .and_then(|h| h.to_str().ok())
    {
        return real_ip.to_string();
    }

    // Fall back to connection info
    if let Some(connect_info) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip().to_string();
    }

    // Last resort: unknown
    "unknown".to_string()
}

/// Shared limiter core used by every tier
async fn check_tier(
    state: &AppState,
    request: Request,
    next: Next,
    prefix: &str,
    limit: u64,
    window_seconds: u64,
    code: &'static str,
) -> Result<Response, RateLimitError> {
    let client_id = get_client_identifier(&request);
    let key = format!("{}:{}", prefix, client_id);

    let (count, allowed) = match state
        .rate_limiter
        .check_rate_limit(&key, limit, window_seconds)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            // Fail closed when the limiter itself errors
            tracing::error!(error = %e, "Rate limit check failed - denying request");
            return Err(RateLimitError {
                retry_after: window_seconds,
                code,
            });
        }
    };

    if !allowed {
        tracing::warn!(client = %client_id, count = count, tier = prefix, "Rate limit exceeded");
        return Err(RateLimitError {
            retry_after: window_seconds,
            code,
        });
    }

    let mut response = next.run(request).await;

    // Add rate limit headers
    let remaining = limit.saturating_sub(count);
    response.headers_mut().insert(
        "X-RateLimit-Limit",
        HeaderValue::from_str(&limit.to_string()).unwrap(),
    );
    response.headers_mut().insert(
        "X-RateLimit-Remaining",
        HeaderValue::from_str(&remaining.to_string()).unwrap(),
    );

    Ok(response)
}

/// General API rate limiting.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    check_tier(
        &state,
        request,
        next,
        "general",
        RATE_LIMIT_REQUESTS,
        RATE_LIMIT_WINDOW_SECONDS,
        "RATE_LIMIT_EXCEEDED",
    )
    .await
}

/// Stricter rate limiting for authentication endpoints.
pub async fn rate_limit_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    check_tier(
        &state,
        request,
        next,
        "auth",
        RATE_LIMIT_AUTH_REQUESTS,
        RATE_LIMIT_AUTH_WINDOW_SECONDS,
        "AUTH_RATE_LIMIT_EXCEEDED",
    )
    .await
}

/// Rate limiting for AI review generation.
pub async fn rate_limit_ai_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    check_tier(
        &state,
        request,
        next,
        "ai",
        RATE_LIMIT_AI_REQUESTS,
        RATE_LIMIT_AI_WINDOW_SECONDS,
        "AI_RATE_LIMIT_EXCEEDED",
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_error_response() {
        let error = RateLimitError {
            retry_after: 60,
            code: "RATE_LIMIT_EXCEEDED",
        };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get("Retry-After").unwrap(),
            &HeaderValue::from_static("60")
        );
    }
}
