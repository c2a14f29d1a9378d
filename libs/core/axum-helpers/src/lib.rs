//! # Axum Helpers
//!
//! Shared building blocks for the Axum services in this workspace.
//!
//! - **[`server`]**: router assembly, health/readiness, graceful shutdown
//! - **[`http`]**: cross-origin header middleware
//! - **[`errors`]**: `{ "error": ... }` responses and router fallbacks

pub mod errors;
pub mod http;
pub mod server;

pub use errors::{
    AppError, ErrorResponse,
    handlers::{method_not_allowed, not_found},
};
pub use http::{CorsPolicy, cors_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};
