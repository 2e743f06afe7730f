//! Response header hardening
//!
//! Every response, success or error, passes through [`HeaderPolicy`]
//! before leaving the service. CORS headers are added only when the
//! request's `Origin` equals an allow-listed origin string exactly; prefix
//! and substring matches are deliberately not honored.

use crate::web::state::AppState;
use axum::{
    extract::{Request, State},
    http::{
        header::{
            HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
        },
        Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Headers applied to every outbound response.
const STATIC_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self'; script-src 'self' 'unsafe-inline'; img-src 'self' data: https:; \
         style-src 'self' 'unsafe-inline'; connect-src 'self'; form-action 'self'; \
         frame-ancestors 'none'; base-uri 'none'; object-src 'none'; upgrade-insecure-requests;",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "permissions-policy",
        "accelerometer=(), autoplay=(), camera=(), display-capture=(), encrypted-media=(), \
         fullscreen=(), geolocation=(), gyroscope=(), magnetometer=(), microphone=(), midi=(), \
         payment=(), picture-in-picture=(), publickey-credentials-get=(), screen-wake-lock=(), \
         sync-xhr=(), usb=(), web-share=(), xr-spatial-tracking=()",
    ),
    (
        "strict-transport-security",
        "max-age=31536000; includeSubDomains; preload",
    ),
    (
        "cache-control",
        "no-store, no-cache, must-revalidate, proxy-revalidate, max-age=0",
    ),
    ("pragma", "no-cache"),
    ("expires", "0"),
    ("x-dns-prefetch-control", "off"),
    ("cross-origin-resource-policy", "same-origin"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-embedder-policy", "require-corp"),
];

/// The fixed security-header policy plus the CORS origin allow-list.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    allowed_origins: Vec<String>,
}

impl HeaderPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    /// Apply the policy to an outbound header map.
    pub fn apply(&self, headers: &mut HeaderMap, origin: Option<&str>) {
        for (name, value) in STATIC_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        if let Some(origin) = origin {
            if self.origin_allowed(origin) {
                if let Ok(value) = HeaderValue::from_str(origin) {
                    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
                    headers.insert(
                        ACCESS_CONTROL_ALLOW_METHODS,
                        HeaderValue::from_static("GET, OPTIONS"),
                    );
                    headers.insert(VARY, HeaderValue::from_static("Origin"));
                }
            }
        }
    }

    /// Exact string match against the allow-list.
    fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

/// Middleware wrapping every response with the header policy.
///
/// `OPTIONS` on any path short-circuits here to an empty 204 carrying only
/// the policy, before routing runs.
pub async fn harden(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        state.headers.apply(response.headers_mut(), origin.as_deref());
        return response;
    }

    let mut response = next.run(request).await;
    state.headers.apply(response.headers_mut(), origin.as_deref());
    response
}
