//! API-level tests for response shapes and error mapping.
//!
//! These tests exercise the pieces handlers are built from (error
//! conversion, wire DTOs, the AI pipeline, rate limiting) without
//! requiring a database connection.

use std::sync::Arc;
use std::time::Duration;

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use uuid::Uuid;

use code_review_api::domain::{Language, Review, ReviewResponse, ReviewStyle, User, UserRole};
use code_review_api::errors::AppError;
use code_review_api::infra::{InMemoryRateLimiter, RateLimitStore};
use code_review_api::services::{MockGenerator, ReviewPipeline};

// =============================================================================
// Error response shape
// =============================================================================

async fn response_json(error: AppError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_error_body_shape() {
    let (status, body) = response_json(AppError::NotFound).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_auth_error_statuses() {
    let (status, body) = response_json(AppError::TokenExpired).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_EXPIRED");

    let (status, body) = response_json(AppError::InvalidToken).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");

    // Bad credentials are a 400 with the generic message
    let (status, body) = response_json(AppError::InvalidCredentials).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_duplicate_field_is_400_with_specific_message() {
    let (status, body) = response_json(AppError::duplicate("Email already in use")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already in use");
    assert_eq!(body["code"], "DUPLICATE_FIELD");
}

#[tokio::test]
async fn test_ai_dependency_statuses() {
    let (status, _) = response_json(AppError::Timeout).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);

    let (status, _) = response_json(AppError::ContentBlocked).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = response_json(AppError::RateLimited).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _) = response_json(AppError::unavailable("Gemini API")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_ownership_statuses() {
    let (status, _) = response_json(AppError::Forbidden).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = response_json(AppError::NotFound).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_internal_details_are_hidden() {
    let (status, body) = response_json(AppError::internal("secret stack trace")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "An internal error occurred");
    assert!(!body["message"].as_str().unwrap().contains("secret"));
}

// =============================================================================
// Wire DTO shapes
// =============================================================================

#[test]
fn test_user_response_serialization() {
    let user = User {
        id: Uuid::new_v4(),
        username: "ada_l".to_string(),
        email: "ada@example.com".to_string(),
        password_hash: "hash".to_string(),
        role: UserRole::User,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        last_login: None,
    };

    let json = serde_json::to_value(code_review_api::domain::UserResponse::from(user)).unwrap();

    assert_eq!(json["username"], "ada_l");
    assert_eq!(json["role"], "user");
    assert!(json.get("createdAt").is_some());
    assert!(json.get("password_hash").is_none());
    assert!(json.get("passwordHash").is_none());
}

#[test]
fn test_review_response_serialization() {
    let review = Review {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        code: "fn main() {}".to_string(),
        review: "# ok".to_string(),
        language: Language::Rust,
        review_style: Some(ReviewStyle::Concise),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let json = serde_json::to_value(ReviewResponse::from(review)).unwrap();

    assert_eq!(json["language"], "rust");
    assert_eq!(json["reviewStyle"], "concise");
    assert!(json.get("createdAt").is_some());
    // The owner id is not part of the client shape
    assert!(json.get("userId").is_none());
}

// =============================================================================
// AI pipeline through its public surface
// =============================================================================

fn mock_pipeline() -> ReviewPipeline {
    ReviewPipeline::with_generators(
        None,
        Arc::new(MockGenerator::with_delay(Duration::ZERO)),
        true,
    )
}

#[tokio::test]
async fn test_generated_review_metadata_shape() {
    let generated = mock_pipeline()
        .generate_review("fn main() {}", Language::Rust, ReviewStyle::Detailed)
        .await
        .unwrap();

    let json = serde_json::to_value(&generated.metadata).unwrap();

    assert_eq!(json["isMock"], true);
    assert_eq!(json["fallback"], false);
    assert_eq!(json["downgraded"], false);
    assert_eq!(json["language"], "rust");
    assert_eq!(json["reviewStyle"], "detailed");
    assert!(json["metrics"]["lineCount"].is_number());
}

#[tokio::test]
async fn test_health_shape() {
    let health = mock_pipeline().health().await;
    let json = serde_json::to_value(&health).unwrap();

    assert_eq!(json["service"], "AI Service");
    assert_eq!(json["type"], "Mock AI Service");
    assert_eq!(json["isMock"], true);
    assert_eq!(json["forceMock"], true);
    assert_eq!(json["status"], "operational");
}

// =============================================================================
// Rate limiter behavior
// =============================================================================

#[tokio::test]
async fn test_rate_limiter_denies_after_limit() {
    let limiter = InMemoryRateLimiter::new();

    for _ in 0..5 {
        let (_, allowed) = limiter.check_rate_limit("ip:1.2.3.4", 5, 60).await.unwrap();
        assert!(allowed);
    }

    let (count, allowed) = limiter.check_rate_limit("ip:1.2.3.4", 5, 60).await.unwrap();
    assert!(!allowed);
    assert_eq!(count, 5);

    // A different client is unaffected
    let (_, allowed) = limiter.check_rate_limit("ip:5.6.7.8", 5, 60).await.unwrap();
    assert!(allowed);
}
