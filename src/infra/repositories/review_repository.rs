//! Review repository - persisted review history access.
//!
//! Queries are id-based; ownership checks live in the service layer so
//! that "absent" and "owned by someone else" stay distinguishable.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::review::{self, ActiveModel, Entity as ReviewEntity};
use crate::domain::{NewReview, Review, ReviewPatch};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Review repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Find review by ID (no ownership filter)
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>>;

    /// List a user's reviews, newest first, with total count
    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Review>, u64)>;

    /// Create a review owned by the given user
    async fn create(&self, user_id: Uuid, data: NewReview) -> AppResult<Review>;

    /// Apply a patch to an existing review
    async fn update(&self, id: Uuid, patch: ReviewPatch) -> AppResult<Review>;

    /// Delete a review by ID
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of ReviewRepository backed by SeaORM
pub struct ReviewStore {
    db: DatabaseConnection,
}

impl ReviewStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewRepository for ReviewStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>> {
        let result = ReviewEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Review::from))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Review>, u64)> {
        let paginator = ReviewEntity::find()
            .filter(review::Column::UserId.eq(user_id))
            .order_by_desc(review::Column::CreatedAt)
            .paginate(&self.db, params.limit());

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(Review::from).collect(), total))
    }

    async fn create(&self, user_id: Uuid, data: NewReview) -> AppResult<Review> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            code: Set(data.code),
            review: Set(data.review),
            language: Set(data.language.as_str().to_string()),
            review_style: Set(data.review_style.map(|s| s.as_str().to_string())),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Review::from(model))
    }

    async fn update(&self, id: Uuid, patch: ReviewPatch) -> AppResult<Review> {
        let existing = ReviewEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();

        if let Some(code) = patch.code {
            active.code = Set(code);
        }
        if let Some(review_text) = patch.review {
            active.review = Set(review_text);
        }
        if let Some(language) = patch.language {
            active.language = Set(language.as_str().to_string());
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;

        Ok(Review::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ReviewEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
