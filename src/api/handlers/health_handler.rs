//! Liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::AppState;

/// Basic liveness response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub environment: String,
}

/// Database connectivity response
#[derive(Serialize, ToSchema)]
pub struct DbHealthResponse {
    pub status: &'static str,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Dependency configuration response
#[derive(Serialize, ToSchema)]
pub struct ServicesHealthResponse {
    pub services: ServiceStatuses,
}

#[derive(Serialize, ToSchema)]
pub struct ServiceStatuses {
    pub ai: &'static str,
}

/// Create health routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/db", get(db_health))
        .route("/services", get(services_health))
}

/// Basic liveness probe
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        environment: state.config.environment.clone(),
    })
}

/// Database connectivity probe
#[utoipa::path(
    get,
    path = "/api/health/db",
    tag = "Health",
    responses(
        (status = 200, description = "Database reachable", body = DbHealthResponse),
        (status = 503, description = "Database unreachable", body = DbHealthResponse)
    )
)]
pub async fn db_health(State(state): State<AppState>) -> (StatusCode, Json<DbHealthResponse>) {
    match state.database.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(DbHealthResponse {
                status: "connected",
                connected: true,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(DbHealthResponse {
                    status: "disconnected",
                    connected: false,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Dependency configuration probe
#[utoipa::path(
    get,
    path = "/api/health/services",
    tag = "Health",
    responses((status = 200, description = "Dependency configuration", body = ServicesHealthResponse))
)]
pub async fn services_health(State(state): State<AppState>) -> Json<ServicesHealthResponse> {
    let ai = if state.config.force_mock_ai {
        "mock"
    } else if state.config.gemini_api_key.is_some() {
        "configured"
    } else {
        "not configured"
    };

    Json(ServicesHealthResponse {
        services: ServiceStatuses { ai },
    })
}
