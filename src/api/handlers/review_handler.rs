//! Review history handlers.
//!
//! Every route requires authentication; the owner always comes from the
//! verified session, never from the request body.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Language, NewReview, ReviewPatch, ReviewResponse, ReviewStyle};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, Paginated, PaginationParams};

/// Review creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    /// Submitted source code
    #[validate(length(min = 1, max = 50_000, message = "Code must be between 1 and 50,000 characters"))]
    pub code: String,
    /// Generated review text
    #[validate(length(min = 1, message = "Review is required"))]
    pub review: String,
    /// Language of the submitted code
    pub language: Language,
    /// Style the review was generated with
    pub review_style: Option<ReviewStyle>,
}

/// Review update request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[validate(length(min = 1, max = 50_000, message = "Code must be between 1 and 50,000 characters"))]
    pub code: Option<String>,
    #[validate(length(min = 1, message = "Review cannot be empty"))]
    pub review: Option<String>,
    pub language: Option<Language>,
}

/// Create review history routes (auth middleware is layered on the nest)
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review).get(list_reviews))
        .route(
            "/:id",
            get(get_review).put(update_review).delete(delete_review),
        )
}

/// Save a generated review
#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review saved", body = ReviewResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> AppResult<Created<ReviewResponse>> {
    let review = state
        .review_service
        .create_review(
            current_user.id,
            NewReview {
                code: payload.code,
                review: payload.review,
                language: payload.language,
                review_style: payload.review_style,
            },
        )
        .await?;

    Ok(Created(ReviewResponse::from(review)))
}

/// List the caller's reviews, newest first
#[utoipa::path(
    get,
    path = "/api/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<u64>, Query, description = "Page number (1-indexed)"),
        ("per_page" = Option<u64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Caller's reviews, newest first"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<ReviewResponse>>> {
    let page = params.page;
    let per_page = params.limit();

    let (reviews, total) = state
        .review_service
        .list_reviews(current_user.id, params)
        .await?;

    let data = reviews.into_iter().map(ReviewResponse::from).collect();

    Ok(Json(Paginated::new(data, page, per_page, total)))
}

/// Get one review by id
#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review identifier")),
    responses(
        (status = 200, description = "The review", body = ReviewResponse),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such review")
    )
)]
pub async fn get_review(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReviewResponse>> {
    let review = state.review_service.get_review(current_user.id, id).await?;

    Ok(Json(ReviewResponse::from(review)))
}

/// Update one review
#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review identifier")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated review", body = ReviewResponse),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such review")
    )
)]
pub async fn update_review(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateReviewRequest>,
) -> AppResult<Json<ReviewResponse>> {
    let review = state
        .review_service
        .update_review(
            current_user.id,
            id,
            ReviewPatch {
                code: payload.code,
                review: payload.review,
                language: payload.language,
            },
        )
        .await?;

    Ok(Json(ReviewResponse::from(review)))
}

/// Delete one review
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review identifier")),
    responses(
        (status = 200, description = "Review removed"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such review")
    )
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    state
        .review_service
        .delete_review(current_user.id, id)
        .await?;

    Ok(Json(ApiResponse::message("Review removed")))
}
