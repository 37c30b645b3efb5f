//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, InMemoryRateLimiter, RateLimitStore};
use crate::services::{AuthService, ReviewPipeline, ReviewService, Services};

/// Application state shared by every handler and middleware.
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Review history service
    pub review_service: Arc<dyn ReviewService>,
    /// AI review pipeline
    pub ai_pipeline: Arc<ReviewPipeline>,
    /// Request rate limiter
    pub rate_limiter: Arc<dyn RateLimitStore>,
    /// Database connection (health checks)
    pub database: Arc<Database>,
    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Create application state from a database connection and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let services = Services::from_connection(database.get_connection(), config.clone());

        Self {
            auth_service: services.auth(),
            review_service: services.reviews(),
            ai_pipeline: services.ai(),
            rate_limiter: Arc::new(InMemoryRateLimiter::new()),
            database,
            config,
        }
    }

    /// Create application state with manually injected services (tests).
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        review_service: Arc<dyn ReviewService>,
        ai_pipeline: Arc<ReviewPipeline>,
        rate_limiter: Arc<dyn RateLimitStore>,
        database: Arc<Database>,
        config: Config,
    ) -> Self {
        Self {
            auth_service,
            review_service,
            ai_pipeline,
            rate_limiter,
            database,
            config,
        }
    }
}
