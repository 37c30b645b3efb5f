//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - In-process rate limiting
//! - Repository access via Persistence

pub mod db;
pub mod persistence;
pub mod rate_limit;
pub mod repositories;

pub use db::{Database, Migrator};
pub use persistence::{Persistence, Repositories};
pub use rate_limit::{InMemoryRateLimiter, RateLimitStore};
pub use repositories::{ReviewRepository, ReviewStore, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockReviewRepository, MockUserRepository};
