//! AI review generation handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{Language, ReviewStyle};
use crate::errors::AppResult;
use crate::services::{AiHealth, ReviewMetadata};

/// Review generation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReviewRequest {
    /// Source code to review
    #[validate(length(min = 1, max = 50_000, message = "Code must be between 1 and 50,000 characters"))]
    pub code: String,
    /// Language of the code (defaults to javascript)
    #[serde(default)]
    pub language: Language,
    /// Review style (defaults to detailed)
    #[serde(default)]
    pub review_style: ReviewStyle,
}

/// Review generation response
#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateReviewResponse {
    pub success: bool,
    /// Generated review text (markdown)
    pub review: String,
    /// How the review was produced
    pub metadata: ReviewMetadata,
}

/// Create AI routes
pub fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/review", post(generate_review))
        .route("/health", get(ai_health))
}

/// Generate a code review
#[utoipa::path(
    post,
    path = "/api/ai/review",
    tag = "AI",
    request_body = GenerateReviewRequest,
    responses(
        (status = 200, description = "Generated review", body = GenerateReviewResponse),
        (status = 400, description = "Missing or oversized code"),
        (status = 408, description = "Generation timed out"),
        (status = 422, description = "Content blocked by safety filters"),
        (status = 429, description = "Upstream quota exceeded"),
        (status = 503, description = "AI service unavailable")
    )
)]
pub async fn generate_review(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<GenerateReviewRequest>,
) -> AppResult<Json<GenerateReviewResponse>> {
    tracing::info!(
        language = %payload.language,
        style = %payload.review_style,
        code_len = payload.code.len(),
        "Processing code review request"
    );

    let generated = state
        .ai_pipeline
        .generate_review(&payload.code, payload.language, payload.review_style)
        .await?;

    tracing::info!(
        review_len = generated.review.len(),
        is_mock = generated.metadata.is_mock,
        fallback = generated.metadata.fallback,
        "Code review generated"
    );

    Ok(Json(GenerateReviewResponse {
        success: true,
        review: generated.review,
        metadata: generated.metadata,
    }))
}

/// AI service health
#[utoipa::path(
    get,
    path = "/api/ai/health",
    tag = "AI",
    responses(
        (status = 200, description = "AI service operational", body = AiHealth),
        (status = 503, description = "AI service unavailable", body = AiHealth)
    )
)]
pub async fn ai_health(State(state): State<AppState>) -> (StatusCode, Json<AiHealth>) {
    let health = state.ai_pipeline.health().await;

    let status = if health.status == "operational" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}
