use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::cors::{CorsPolicy, cors_headers};
use axum::{Router, middleware};
use core_config::{cors::CorsConfig, server::ServerConfig};
use std::future::Future;
use std::io;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Wrap API routes with the cross-cutting pieces every service shares.
///
/// - Swagger UI at `/swagger-ui`, OpenAPI document at `/api-docs/openapi.json`
/// - `apis` nested under `/api`
/// - JSON 404 fallback
/// - request tracing and response compression
/// - cross-origin headers on every response, `OPTIONS` answered up front
///
/// Routers passed in should already have their state applied.
///
/// # Errors
/// Returns `InvalidInput` when the CORS configuration cannot be rendered as
/// header values.
pub fn create_router<T>(apis: Router, cors: &CorsConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let policy = CorsPolicy::from_config(cors).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid CORS configuration: {}", e),
        )
    })?;

    info!(
        origins = ?cors.allowed_origins,
        methods = ?cors.allowed_methods,
        headers = ?cors.allowed_headers,
        "CORS configured"
    );

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn_with_state(Arc::new(policy), cors_headers));

    Ok(router)
}

/// Serve `router` until SIGINT/SIGTERM, then run `cleanup` bounded by the
/// configured shutdown timeout.
///
/// ```ignore
/// create_production_app(router, &config.server, async move {
///     drop(mongo_client);
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::new();
    let shutdown_timeout = server_config.shutdown_timeout();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_trigger = coordinator.clone();
    let cleanup_handle = tokio::spawn(async move {
        cleanup_trigger.triggered().await;

        info!(?shutdown_timeout, "Starting cleanup tasks");
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(()) => info!("Cleanup completed successfully"),
            Err(_) => tracing::warn!(?shutdown_timeout, "Cleanup exceeded timeout, forcing shutdown"),
        }
    });

    let signal = coordinator.clone();
    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { signal.wait_for_signal().await })
        .await
        .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e));

    // Release the cleanup task even when serve failed before any signal
    coordinator.trigger();
    cleanup_handle.await.ok();

    serve_result
}
