//! Persistence - centralized repository access.
//!
//! Every write in this system touches exactly one row, so there is no
//! transaction machinery here; the trait only hands out repositories.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{ReviewRepository, ReviewStore, UserRepository, UserStore};

/// Repository access trait for dependency injection.
pub trait Persistence: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get review repository
    fn reviews(&self) -> Arc<dyn ReviewRepository>;
}

/// Concrete implementation of Persistence over a live connection
pub struct Repositories {
    user_repo: Arc<UserStore>,
    review_repo: Arc<ReviewStore>,
}

impl Repositories {
    /// Create new persistence instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            review_repo: Arc::new(ReviewStore::new(db)),
        }
    }
}

impl Persistence for Repositories {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        self.review_repo.clone()
    }
}
