//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{ai_handler, auth_handler, health_handler, review_handler};
use crate::domain::{Language, ReviewResponse, ReviewStyle, UserResponse, UserRole};
use crate::services::{AiHealth, AuthResponse, CodeMetrics, Complexity, ReviewMetadata};

/// OpenAPI documentation for the Code Review API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Code Review API",
        version = "0.1.0",
        description = "AI-assisted code review service with authentication and review history",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::refresh_token,
        auth_handler::profile,
        // AI endpoints
        ai_handler::generate_review,
        ai_handler::ai_health,
        // Review history endpoints
        review_handler::create_review,
        review_handler::list_reviews,
        review_handler::get_review,
        review_handler::update_review,
        review_handler::delete_review,
        // Health endpoints
        health_handler::health,
        health_handler::db_health,
        health_handler::services_health,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            Language,
            ReviewStyle,
            ReviewResponse,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::RefreshTokenRequest,
            AuthResponse,
            // AI types
            ai_handler::GenerateReviewRequest,
            ai_handler::GenerateReviewResponse,
            ReviewMetadata,
            CodeMetrics,
            Complexity,
            AiHealth,
            // Review history types
            review_handler::CreateReviewRequest,
            review_handler::UpdateReviewRequest,
            // Health types
            health_handler::HealthResponse,
            health_handler::DbHealthResponse,
            health_handler::ServicesHealthResponse,
            health_handler::ServiceStatuses,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User registration, login and tokens"),
        (name = "AI", description = "AI review generation"),
        (name = "Reviews", description = "Saved review history"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

/// Registers the bearer token security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
