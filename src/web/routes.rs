//! Route definitions

use super::handlers;
use super::headers;
use super::state::AppState;
use axum::{body::Body, http::Request, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
///
/// `/search` accepts GET only; axum answers other methods with 405.
/// `OPTIONS` on any path is short-circuited by the hardening middleware,
/// which also stamps the security-header policy onto every response,
/// errors included.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/search", get(handlers::search))
        .route("/suggest", get(handlers::suggest))
        .route("/health", get(handlers::health))
        // Everything else belongs to the asset-store collaborator.
        .fallback(handlers::asset)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            headers::harden,
        ))
        // Spans carry the path only, never the query string: the raw query
        // must not reach the observability channel.
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Asset, MemoryAssetStore};
    use crate::config::{RealIpMethod, Settings};
    use crate::limiter::MemoryKvStore;
    use axum::body::Body;
    use axum::http::{
        header::{ACCESS_CONTROL_ALLOW_ORIGIN, LOCATION, RETRY_AFTER},
        Method, Request, StatusCode,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router_with(settings: Settings) -> Router {
        let mut assets = MemoryAssetStore::new();
        assets.insert(
            "/opensearch.xml",
            Asset::new(
                "application/opensearchdescription+xml",
                "<OpenSearchDescription/>",
            ),
        );
        let state = AppState::new(
            settings,
            Arc::new(MemoryKvStore::default()),
            Arc::new(assets),
        );
        create_router(state)
    }

    fn router() -> Router {
        router_with(Settings::default())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header("x-real-ip", "203.0.113.50")
            .header("user-agent", "router-tests")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_question_routes_to_question_engine() {
        let app = router();
        let req = get_request(
            "/search?q=what+is+rust&keywordEngine=bing&questionEngine=perplexity",
        );
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::FOUND);
        let location = res.headers().get(LOCATION).unwrap().to_str().unwrap();
        assert!(location.starts_with("https://www.perplexity.ai/search?q="));
        assert!(location.contains("what%20is%20rust"));
    }

    #[tokio::test]
    async fn test_keyword_routes_to_keyword_engine() {
        let app = router();
        let req = get_request("/search?q=rust+lang&keywordEngine=bing");
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::FOUND);
        let location = res.headers().get(LOCATION).unwrap().to_str().unwrap();
        assert!(location.starts_with("https://www.bing.com/search?q="));
    }

    #[tokio::test]
    async fn test_country_signal_picks_google_domain() {
        let app = router();
        let req = Request::builder()
            .uri("/search?q=rust")
            .header("cf-ipcountry", "GB")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::FOUND);
        let location = res.headers().get(LOCATION).unwrap().to_str().unwrap();
        assert_eq!(location, "https://www.google.co.uk/search?q=rust&gl=GB");
    }

    #[tokio::test]
    async fn test_invalid_country_signal_falls_back() {
        let app = router();
        let req = Request::builder()
            .uri("/search?q=rust")
            .header("cf-ipcountry", "gb1")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        let location = res.headers().get(LOCATION).unwrap().to_str().unwrap();
        assert_eq!(location, "https://www.google.com/search?q=rust&gl=US");
    }

    #[tokio::test]
    async fn test_unknown_engine_selector_uses_default() {
        let app = router();
        let req = get_request("/search?q=rust&keywordEngine=yandex");
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::FOUND);
        let location = res.headers().get(LOCATION).unwrap().to_str().unwrap();
        assert!(location.contains("google.com"));
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let app = router();
        for uri in ["/search?q=", "/search", "/search?q=%3C%3E"] {
            let res = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "uri {}", uri);
        }
    }

    #[tokio::test]
    async fn test_non_get_method_is_rejected() {
        let app = router();
        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/search?q=rust")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_options_short_circuits_without_cors() {
        let app = router();
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/search")
            .header("origin", "https://unlisted.example")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(!res.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
        assert_eq!(res.headers().get("x-frame-options").unwrap(), "DENY");
    }

    #[tokio::test]
    async fn test_options_with_allow_listed_origin_gets_cors() {
        let mut settings = Settings::default();
        settings.security.allowed_origins = vec!["https://search.example.com".to_string()];
        let app = router_with(settings);

        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/anything")
            .header("origin", "https://search.example.com")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://search.example.com"
        );
    }

    #[tokio::test]
    async fn test_security_headers_on_every_response_class() {
        let app = router();

        // Success (redirect), validation error, and asset miss all carry
        // the same header policy.
        for uri in ["/search?q=rust", "/search?q=", "/no/such/path"] {
            let res = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(
                res.headers().get("x-frame-options").unwrap(),
                "DENY",
                "uri {}",
                uri
            );
            assert!(
                res.headers().contains_key("content-security-policy"),
                "uri {}",
                uri
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_path_delegates_to_assets() {
        let app = router();

        let res = app
            .clone()
            .oneshot(get_request("/opensearch.xml"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get("content-type").unwrap(),
            "application/opensearchdescription+xml"
        );

        let res = app.oneshot(get_request("/missing.png")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rate_limit_returns_429_with_retry_hint() {
        let mut settings = Settings::default();
        settings.limiter.max_requests = 2;
        settings.server.real_ip_method = RealIpMethod::XRealIp;
        let app = router_with(settings);

        for _ in 0..2 {
            let res = app
                .clone()
                .oneshot(get_request("/search?q=rust"))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::FOUND);
        }

        let res = app
            .clone()
            .oneshot(get_request("/search?q=rust"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry: u64 = res
            .headers()
            .get(RETRY_AFTER)
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry > 0);
    }

    #[tokio::test]
    async fn test_suggest_echoes_sanitized_query() {
        let app = router();
        let res = app
            .oneshot(get_request("/suggest?q=rust+%3Cscript%3E"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json[0], "rust");
    }

    #[tokio::test]
    async fn test_health() {
        let app = router();
        let res = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[derive(Clone)]
    struct CaptureWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_raw_query_never_reaches_logs() {
        let buffer = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let writer = CaptureWriter(buffer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = router();
        let res = app
            .oneshot(get_request(
                "/search?q=my+secret+raw+query+%3Cscript%3E",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);

        let logs = String::from_utf8_lossy(&buffer.lock().unwrap()).to_string();
        assert!(!logs.is_empty(), "trace layer should have logged something");
        assert!(
            !logs.contains("my+secret") && !logs.contains("my secret"),
            "raw query leaked into logs: {}",
            logs
        );
        // The path alone is fine to record.
        assert!(logs.contains("/search"));
    }
}
