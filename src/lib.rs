//! Code Review API - AI-assisted code review service
//!
//! Users register, submit source code, receive an AI-generated review
//! (Gemini with a local mock fallback) and keep a per-user review history.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases (auth, reviews, AI pipeline)
//! - **infra**: Infrastructure concerns (database, rate limiting)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Language, Password, Review, ReviewStyle, User, UserRole};
pub use errors::{AppError, AppResult};
