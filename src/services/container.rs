//! Service container - centralized service construction and access.

use std::sync::Arc;

use super::ai::ReviewPipeline;
use super::{AuthService, Authenticator, ReviewManager, ReviewService};
use crate::config::Config;
use crate::infra::Repositories;

/// Holds every application service behind its trait.
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    review_service: Arc<dyn ReviewService>,
    ai_pipeline: Arc<ReviewPipeline>,
}

impl Services {
    /// Create a service container with explicit services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        review_service: Arc<dyn ReviewService>,
        ai_pipeline: Arc<ReviewPipeline>,
    ) -> Self {
        Self {
            auth_service,
            review_service,
            ai_pipeline,
        }
    }

    /// Create a service container from a database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let persistence = Arc::new(Repositories::new(db));
        let auth_service = Arc::new(Authenticator::new(persistence.clone(), config.clone()));
        let review_service = Arc::new(ReviewManager::new(persistence));
        let ai_pipeline = Arc::new(ReviewPipeline::from_config(&config));

        Self {
            auth_service,
            review_service,
            ai_pipeline,
        }
    }

    /// Get authentication service
    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    /// Get review service
    pub fn reviews(&self) -> Arc<dyn ReviewService> {
        self.review_service.clone()
    }

    /// Get the AI review pipeline
    pub fn ai(&self) -> Arc<ReviewPipeline> {
        self.ai_pipeline.clone()
    }
}
