use crate::config::toml_config::CorsConfig;
use crate::core::fetcher::OrderFetcher;
use crate::core::{ErpClient, Record};
use crate::utils::error::{GatewayError, Result};
use axum::extract::State;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Single trusted origin, matched against the request's `Origin`; methods and
/// headers are mirrored because wildcards are not allowed together with
/// credentials.
pub fn build_cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(config.allowed_origin()).map_err(|e| {
        GatewayError::InvalidConfigValueError {
            field: "server.cors.allowed_origin".to_string(),
            value: config.allowed_origin().to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(config.allow_credentials()))
}

async fn list_orders<C: ErpClient + 'static>(
    State(fetcher): State<Arc<OrderFetcher<C>>>,
) -> Result<Json<Vec<Record>>> {
    let records = fetcher.fetch_orders().await?;
    Ok(Json(records))
}

pub fn router<C: ErpClient + 'static>(
    fetcher: Arc<OrderFetcher<C>>,
    cors: &CorsConfig,
) -> Result<Router> {
    Ok(Router::new()
        .route("/orders", get(list_orders::<C>))
        .layer(build_cors_layer(cors)?)
        .layer(TraceLayer::new_for_http())
        .with_state(fetcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BulkReadQuery, Uid};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    struct StaticErp {
        login_ok: bool,
    }

    #[async_trait]
    impl ErpClient for StaticErp {
        async fn authenticate(&self) -> Result<Uid> {
            if self.login_ok {
                Ok(2)
            } else {
                Err(GatewayError::AuthenticationFailed {
                    db: "shop".to_string(),
                    username: "api".to_string(),
                })
            }
        }

        async fn bulk_read(&self, _uid: Uid, _query: &BulkReadQuery) -> Result<Vec<Record>> {
            let row = serde_json::json!({"id": 1, "name": "S00001", "state": "sale"});
            Ok(vec![serde_json::from_value(row)?])
        }
    }

    fn app(login_ok: bool) -> Router {
        let fetcher = OrderFetcher::new(StaticErp { login_ok }, BulkReadQuery::default());
        router(Arc::new(fetcher), &CorsConfig::default()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_orders_returns_json_array() {
        let req = Request::builder()
            .uri("/orders")
            .body(Body::empty())
            .unwrap();
        let resp = app(true).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            body_json(resp).await,
            serde_json::json!([{"id": 1, "name": "S00001", "state": "sale"}])
        );
    }

    #[tokio::test]
    async fn test_login_failure_is_server_error() {
        let req = Request::builder()
            .uri("/orders")
            .body(Body::empty())
            .unwrap();
        let resp = app(false).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["code"], "AUTHENTICATION_FAILED");
    }

    #[tokio::test]
    async fn test_other_routes_are_not_found() {
        let req = Request::builder()
            .uri("/orders/1")
            .body(Body::empty())
            .unwrap();
        let resp = app(true).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/orders")
            .body(Body::empty())
            .unwrap();
        let resp = app(true).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let req = Request::builder()
            .uri("/orders")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let resp = app(true).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_other_origins() {
        let req = Request::builder()
            .uri("/orders")
            .header(header::ORIGIN, "http://evil.example.com")
            .body(Body::empty())
            .unwrap();
        let resp = app(true).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_preflight_from_other_origin_is_not_granted() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/orders")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let resp = app(true).oneshot(req).await.unwrap();

        assert!(resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_preflight_mirrors_method_and_headers() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/orders")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-requested-with")
            .body(Body::empty())
            .unwrap();
        let resp = app(true).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let headers = resp.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "GET"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(),
            "x-requested-with"
        );
    }
}
