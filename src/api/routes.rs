//! Application route configuration.

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{ai_routes, auth_routes, health_routes, review_routes};
use super::middleware::{
    auth_middleware, rate_limit_ai_middleware, rate_limit_auth_middleware, rate_limit_middleware,
};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::LEGACY_TOKEN_HEADER;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Health check endpoints (no rate limiting)
        .nest("/api/health", health_routes())
        // Public authentication routes (stricter rate limiting)
        .nest(
            "/api/auth",
            auth_routes(state.clone()).route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_auth_middleware,
            )),
        )
        // AI review generation (own quota tier)
        .nest(
            "/api/ai",
            ai_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                rate_limit_ai_middleware,
            )),
        )
        // Protected review history (JWT + general rate limiting)
        .nest(
            "/api/reviews",
            review_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit_middleware,
                )),
        )
        // Global middleware
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS restricted to the configured origins
fn cors_layer(state: &AppState) -> CorsLayer {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(LEGACY_TOKEN_HEADER),
        ])
        .allow_credentials(true)
}

/// Root endpoint
async fn root() -> &'static str {
    "Welcome to the Code Review API"
}
