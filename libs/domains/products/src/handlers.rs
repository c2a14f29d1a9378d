//! HTTP handlers for Products API

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, MethodNotAllowedResponse,
        NotFoundResponse,
    },
    method_not_allowed, AppError, ErrorResponse,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    CreateProduct, CreateResponse, DeleteQuery, DeleteResponse, ProductChanges, ProductResponse,
    ProductType, UpdateProduct, UpdateResponse,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(list_products, create_product, update_product, delete_product),
    components(
        schemas(
            ProductResponse, ProductType, CreateProduct, UpdateProduct, ProductChanges,
            CreateResponse, UpdateResponse, DeleteResponse, ErrorResponse
        ),
        responses(
            BadRequestResponse,
            NotFoundResponse,
            MethodNotAllowedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalogue endpoints")
    )
)]
pub struct ApiDoc;

/// Create the products router.
///
/// The whole resource lives on a single path; verbs other than
/// GET/POST/PUT/DELETE get a JSON 405. HEAD is routed explicitly since
/// axum would otherwise answer it with the GET handler.
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route(
            "/",
            get(list_products)
                .post(create_product)
                .put(update_product)
                .delete(delete_product)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .with_state(shared_service)
}

/// List all products ordered by name
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "All products, sorted by name", body = Vec<ProductResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = CreateResponse),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    payload: Result<Json<CreateProduct>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let id = service.create_product(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            success: true,
            id: id.to_hex(),
        }),
    ))
}

/// Partially update a product; `id` travels in the body
#[utoipa::path(
    put,
    path = "",
    tag = "Products",
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Fields applied", body = UpdateResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    payload: Result<Json<UpdateProduct>, JsonRejection>,
) -> Result<Json<UpdateResponse>, AppError> {
    let Json(input) = payload?;
    let updated = service.update_product(input).await?;

    Ok(Json(UpdateResponse {
        success: true,
        updated,
    }))
}

/// Delete a product by `?id=`
#[utoipa::path(
    delete,
    path = "",
    tag = "Products",
    params(DeleteQuery),
    responses(
        (status = 200, description = "Product deleted", body = DeleteResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let Query(query) = query?;
    service.delete_product(query.id).await?;

    Ok(Json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProductError;
    use crate::models::Product;
    use crate::repository::MockProductRepository;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use mongodb::bson::{self, oid::ObjectId};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(
        repo: MockProductRepository,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let app = router(ProductService::new(repo));

        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn stored(name: &str) -> Product {
        Product {
            id: Some(ObjectId::new()),
            ..Product::new(
                name.to_string(),
                3.0,
                ProductType::Piece,
                bson::DateTime::now(),
            )
        }
    }

    #[tokio::test]
    async fn test_list_returns_array() {
        let mut repo = MockProductRepository::new();
        repo.expect_list_by_name()
            .returning(|| Ok(vec![stored("Apples"), stored("Bread")]));

        let (status, body) = send(repo, Method::GET, "/", None).await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Apples", "Bread"]);
        assert!(body[0]["_id"].is_string());
        assert_eq!(body[0]["type"], "piece");
    }

    #[tokio::test]
    async fn test_list_storage_failure_is_500_with_raw_message() {
        let mut repo = MockProductRepository::new();
        repo.expect_list_by_name()
            .returning(|| Err(ProductError::Database("connection reset".to_string())));

        let (status, body) = send(repo, Method::GET, "/", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "connection reset" }));
    }

    #[tokio::test]
    async fn test_create_returns_201_with_id() {
        let id = ObjectId::new();
        let mut repo = MockProductRepository::new();
        repo.expect_exists_by_name().returning(|_| Ok(false));
        repo.expect_insert().returning(move |_| Ok(id));

        let (status, body) = send(
            repo,
            Method::POST,
            "/",
            Some(json!({ "name": "Apples", "price": 2.5, "type": "weight" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "success": true, "id": id.to_hex() }));
    }

    #[tokio::test]
    async fn test_create_missing_fields() {
        let (status, body) = send(
            MockProductRepository::new(),
            Method::POST,
            "/",
            Some(json!({ "name": "Apples", "type": "weight" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Name, price, and type are required" }));
    }

    #[tokio::test]
    async fn test_create_bad_type() {
        let (status, body) = send(
            MockProductRepository::new(),
            Method::POST,
            "/",
            Some(json!({ "name": "X", "price": 1, "type": "box" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Type must be \"weight\" or \"piece\"" }));
    }

    #[tokio::test]
    async fn test_create_duplicate_name() {
        let mut repo = MockProductRepository::new();
        repo.expect_exists_by_name().returning(|_| Ok(true));
        repo.expect_insert().never();

        let (status, body) = send(
            repo,
            Method::POST,
            "/",
            Some(json!({ "name": "Apples", "price": 2, "type": "piece" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Product already exists" }));
    }

    #[tokio::test]
    async fn test_create_malformed_json_is_400() {
        let app = router(ProductService::new(MockProductRepository::new()));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from("{ not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_price_only_echoes_changes() {
        let mut repo = MockProductRepository::new();
        repo.expect_update_fields().returning(|_, _| Ok(1));

        let id = ObjectId::new().to_hex();
        let (status, body) = send(
            repo,
            Method::PUT,
            "/",
            Some(json!({ "id": id, "price": "4.25" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let updated = body["updated"].as_object().unwrap();
        let mut keys: Vec<_> = updated.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["price", "updatedAt"]);
        assert_eq!(updated["price"], 4.25);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_404() {
        let mut repo = MockProductRepository::new();
        repo.expect_update_fields().returning(|_, _| Ok(0));

        let (status, body) = send(
            repo,
            Method::PUT,
            "/",
            Some(json!({ "id": ObjectId::new().to_hex(), "name": "Pears" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Product not found" }));
    }

    #[tokio::test]
    async fn test_update_without_fields() {
        let (status, body) = send(
            MockProductRepository::new(),
            Method::PUT,
            "/",
            Some(json!({ "id": ObjectId::new().to_hex() })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No fields to update" }));
    }

    #[tokio::test]
    async fn test_update_without_id() {
        let (status, body) = send(
            MockProductRepository::new(),
            Method::PUT,
            "/",
            Some(json!({ "name": "Pears" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Product ID is required" }));
    }

    #[tokio::test]
    async fn test_update_malformed_id_is_500() {
        let (status, body) = send(
            MockProductRepository::new(),
            Method::PUT,
            "/",
            Some(json!({ "id": "xyz", "name": "Pears" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let id = ObjectId::new();
        let mut repo = MockProductRepository::new();
        repo.expect_delete()
            .withf(move |target| *target == id)
            .returning(|_| Ok(1));

        let (status, body) = send(repo, Method::DELETE, &format!("/?id={}", id.to_hex()), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_404() {
        let mut repo = MockProductRepository::new();
        repo.expect_delete().returning(|_| Ok(0));

        let uri = format!("/?id={}", ObjectId::new().to_hex());
        let (status, body) = send(repo, Method::DELETE, &uri, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Product not found" }));
    }

    #[tokio::test]
    async fn test_delete_without_id() {
        let (status, body) = send(MockProductRepository::new(), Method::DELETE, "/", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Product ID required" }));
    }

    #[tokio::test]
    async fn test_create_non_string_type_is_rejected() {
        let mut repo = MockProductRepository::new();
        repo.expect_exists_by_name().never();
        repo.expect_insert().never();

        let (status, body) = send(
            repo,
            Method::POST,
            "/",
            Some(json!({ "name": "Milk", "price": 1, "type": 5 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Type must be \"weight\" or \"piece\"" }));
    }

    #[tokio::test]
    async fn test_update_non_string_type_is_rejected() {
        let mut repo = MockProductRepository::new();
        repo.expect_update_fields().never();

        let (status, body) = send(
            repo,
            Method::PUT,
            "/",
            Some(json!({ "id": ObjectId::new().to_hex(), "type": 5 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Type must be \"weight\" or \"piece\"" }));
    }

    #[tokio::test]
    async fn test_head_is_405_without_listing() {
        let mut repo = MockProductRepository::new();
        repo.expect_list_by_name().never();

        let (status, _) = send(repo, Method::HEAD, "/", None).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unsupported_method_is_405() {
        let (status, body) = send(MockProductRepository::new(), Method::PATCH, "/", None).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "error": "Method not allowed" }));
    }
}
