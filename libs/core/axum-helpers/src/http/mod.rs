//! HTTP middleware module.
//!
//! Cross-origin headers are configured through [`core_config::cors::CorsConfig`]
//! and applied to every response by [`cors_headers`].
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{CorsPolicy, cors_headers};
//!
//! let policy = Arc::new(CorsPolicy::from_config(&config.cors)?);
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn_with_state(policy, cors_headers));
//! ```

pub mod cors;

pub use cors::{CorsPolicy, cors_headers};
