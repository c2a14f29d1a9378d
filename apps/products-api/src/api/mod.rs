//! API routes module

pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/products", products::router(state))
        .merge(health::router(state))
}

/// Initialize database indexes; failures are logged, never fatal
pub async fn init_indexes(state: &AppState) -> bool {
    products::init_indexes(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use crate::openapi::ApiDoc;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum_helpers::create_router;
    use core_config::{app_info, cors::CorsConfig, server::ServerConfig};
    use database::mongodb::MongoConfig;
    use http_body_util::BodyExt;
    use mongodb::Client;
    use tower::ServiceExt;

    // Nothing listens on port 1, and the short selection timeout keeps
    // storage-touching requests fast to fail.
    const UNREACHABLE_MONGO: &str = "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200";

    async fn state() -> AppState {
        let config = Config {
            app: app_info!(),
            mongodb: MongoConfig::with_database(UNREACHABLE_MONGO, "samanShop"),
            server: ServerConfig::default(),
            cors: CorsConfig::permissive(),
            environment: Environment::Development,
            products_collection: "products".to_string(),
        };
        // Client construction is lazy; no connection is attempted here
        let mongo_client = Client::with_uri_str(UNREACHABLE_MONGO).await.unwrap();
        let db = mongo_client.database(config.mongodb.database());
        AppState {
            config,
            mongo_client,
            db,
        }
    }

    async fn app() -> Router {
        let state = state().await;
        create_router::<ApiDoc>(routes(&state), &state.config.cors).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_preflight_on_products_is_empty_200() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(
            headers["access-control-allow-methods"],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
        assert!(body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_patch_is_405_with_cors_headers() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method(Method::PATCH)
                    .uri("/api/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            body_text(response).await,
            r#"{"error":"Method not allowed"}"#
        );
    }

    #[tokio::test]
    async fn test_validation_errors_do_not_touch_storage() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri("/api/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_text(response).await,
            r#"{"error":"Product ID required"}"#
        );
    }

    #[tokio::test]
    async fn test_storage_failure_is_500_with_cors_headers() {
        let response = app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/api/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert!(body_text(response).await.starts_with(r#"{"error":""#));
    }

    #[tokio::test]
    async fn test_index_failure_is_not_fatal() {
        assert!(!init_indexes(&state().await).await);
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let app = app().await;

        let health = app
            .clone()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        let ready = app
            .oneshot(Request::builder().uri("/api/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
