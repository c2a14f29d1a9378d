use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, InvalidHeaderValue, ORIGIN, VARY,
        },
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use core_config::cors::CorsConfig;
use std::sync::Arc;

/// Pre-rendered cross-origin headers derived from [`CorsConfig`].
#[derive(Clone, Debug)]
pub struct CorsPolicy {
    any_origin: bool,
    origins: Vec<HeaderValue>,
    methods: HeaderValue,
    headers: HeaderValue,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        let origins = config
            .allowed_origins
            .iter()
            .filter(|o| o.as_str() != "*")
            .map(|o| HeaderValue::from_str(o))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            any_origin: config.allows_any_origin(),
            origins,
            methods: HeaderValue::from_str(&config.allowed_methods.join(", "))?,
            headers: HeaderValue::from_str(&config.allowed_headers.join(", "))?,
        })
    }

    pub fn permissive() -> Self {
        Self {
            any_origin: true,
            origins: Vec::new(),
            methods: HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
            headers: HeaderValue::from_static("Content-Type"),
        }
    }

    /// Value for `Access-Control-Allow-Origin`, if the request origin is allowed.
    fn allow_origin(&self, request_origin: Option<&HeaderValue>) -> Option<HeaderValue> {
        if self.any_origin {
            return Some(HeaderValue::from_static("*"));
        }
        request_origin
            .filter(|origin| self.origins.contains(origin))
            .cloned()
    }

    pub fn apply(&self, request_origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        if let Some(origin) = self.allow_origin(request_origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        if !self.any_origin {
            headers.append(VARY, HeaderValue::from_static("origin"));
        }
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.headers.clone());
    }
}

/// Middleware that stamps the cross-origin headers on every response and
/// answers `OPTIONS` itself with an empty 200, before any handler runs.
///
/// ```ignore
/// let policy = Arc::new(CorsPolicy::from_config(&config)?);
/// let app = router.layer(axum::middleware::from_fn_with_state(policy, cors_headers));
/// ```
pub async fn cors_headers(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(ORIGIN).cloned();

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    policy.apply(origin.as_ref(), response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    fn app(policy: CorsPolicy) -> Router {
        Router::new()
            .route("/products", get(|| async { "listed" }))
            .layer(middleware::from_fn_with_state(Arc::new(policy), cors_headers))
    }

    #[tokio::test]
    async fn test_headers_added_to_regular_response() {
        let response = app(CorsPolicy::permissive())
            .oneshot(Request::get("/products").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
    }

    #[tokio::test]
    async fn test_options_short_circuits_on_any_path() {
        let response = app(CorsPolicy::permissive())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/anything/at/all")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_origin_list_echoes_only_allowed_origin() {
        let config = CorsConfig {
            allowed_origins: vec!["https://shop.example.com".to_string()],
            ..CorsConfig::permissive()
        };
        let policy = CorsPolicy::from_config(&config).unwrap();

        let allowed = app(policy.clone())
            .oneshot(
                Request::get("/products")
                    .header(ORIGIN, "https://shop.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://shop.example.com"
        );

        let denied = app(policy)
            .oneshot(
                Request::get("/products")
                    .header(ORIGIN, "https://evil.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(denied.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn test_from_config_rejects_invalid_header_value() {
        let config = CorsConfig {
            allowed_headers: vec!["Content-Type\n".to_string()],
            ..CorsConfig::permissive()
        };
        assert!(CorsPolicy::from_config(&config).is_err());
    }
}
