//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

pub mod ai;
mod auth_service;
pub mod container;
mod review_service;

pub use ai::{
    AiError, AiHealth, CodeMetrics, Complexity, GeminiGenerator, GeneratedReview, MockGenerator,
    ReviewGenerator, ReviewMetadata, ReviewPipeline,
};
pub use auth_service::{AuthResponse, AuthService, Authenticator, Claims};
pub use container::Services;
pub use review_service::{ReviewManager, ReviewService};
