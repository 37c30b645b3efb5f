//! HTTP request handlers.

pub mod ai_handler;
pub mod auth_handler;
pub mod health_handler;
pub mod review_handler;

pub use ai_handler::ai_routes;
pub use auth_handler::auth_routes;
pub use health_handler::health_routes;
pub use review_handler::review_routes;
