//! Review service - owner-scoped review history.
//!
//! The owner id always comes from the verified session, never from the
//! request body, and ownership is re-checked on every read and write.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{NewReview, Review, ReviewPatch};
use crate::errors::{AppError, AppResult};
use crate::infra::Persistence;
use crate::types::PaginationParams;

/// Review service trait for dependency injection.
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Save a review for the given owner
    async fn create_review(&self, owner: Uuid, data: NewReview) -> AppResult<Review>;

    /// List the owner's reviews, newest first
    async fn list_reviews(
        &self,
        owner: Uuid,
        params: PaginationParams,
    ) -> AppResult<(Vec<Review>, u64)>;

    /// Get one review; 404 when absent, 403 when owned by someone else
    async fn get_review(&self, owner: Uuid, id: Uuid) -> AppResult<Review>;

    /// Update one review, same existence/ownership checks as get
    async fn update_review(&self, owner: Uuid, id: Uuid, patch: ReviewPatch) -> AppResult<Review>;

    /// Delete one review, same existence/ownership checks as get
    async fn delete_review(&self, owner: Uuid, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of ReviewService.
pub struct ReviewManager<P: Persistence> {
    persistence: Arc<P>,
}

impl<P: Persistence> ReviewManager<P> {
    /// Create new review service instance
    pub fn new(persistence: Arc<P>) -> Self {
        Self { persistence }
    }

    /// Fetch a review and enforce ownership.
    ///
    /// Absent ids are NotFound; existing reviews owned by another user
    /// are Forbidden, so the two cases stay distinguishable to clients.
    async fn find_owned(&self, owner: Uuid, id: Uuid) -> AppResult<Review> {
        let review = self
            .persistence
            .reviews()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if review.user_id != owner {
            tracing::warn!(review_id = %id, user_id = %owner, "Cross-user review access denied");
            return Err(AppError::Forbidden);
        }

        Ok(review)
    }
}

#[async_trait]
impl<P: Persistence> ReviewService for ReviewManager<P> {
    async fn create_review(&self, owner: Uuid, data: NewReview) -> AppResult<Review> {
        self.persistence.reviews().create(owner, data).await
    }

    async fn list_reviews(
        &self,
        owner: Uuid,
        params: PaginationParams,
    ) -> AppResult<(Vec<Review>, u64)> {
        self.persistence.reviews().list_for_user(owner, &params).await
    }

    async fn get_review(&self, owner: Uuid, id: Uuid) -> AppResult<Review> {
        self.find_owned(owner, id).await
    }

    async fn update_review(&self, owner: Uuid, id: Uuid, patch: ReviewPatch) -> AppResult<Review> {
        self.find_owned(owner, id).await?;
        self.persistence.reviews().update(id, patch).await
    }

    async fn delete_review(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        self.find_owned(owner, id).await?;
        self.persistence.reviews().delete(id).await
    }
}
