//! Health check endpoints

use axum::{extract::State, response::Response, routing::get, Router};
use axum_helpers::{health_router, run_health_checks, HealthCheckFuture};
use database::mongodb::check_health_detailed;

use crate::state::AppState;

/// Readiness: 200 when MongoDB answers a ping, 503 otherwise
async fn ready(State(state): State<AppState>) -> Response {
    let mongodb: HealthCheckFuture = Box::pin(async move {
        let status = check_health_detailed(&state.db).await;
        tracing::debug!(
            healthy = status.healthy,
            response_time_ms = status.response_time_ms,
            "MongoDB readiness probe"
        );
        if status.healthy {
            Ok(())
        } else {
            Err(status
                .message
                .unwrap_or_else(|| "MongoDB ping failed".to_string()))
        }
    });

    run_health_checks(vec![("mongodb", mongodb)]).await
}

/// `GET /health` (liveness) and `GET /ready` (readiness)
pub fn router(state: &AppState) -> Router {
    health_router(state.config.app).merge(
        Router::new()
            .route("/ready", get(ready))
            .with_state(state.clone()),
    )
}
