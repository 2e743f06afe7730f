//! HTTP request handlers

use crate::config::RealIpMethod;
use crate::engines::{self, EngineName};
use crate::geo::CountryCode;
use crate::limiter::{ClientIdentity, Decision};
use crate::query::{self, QueryIntent};
use crate::redirect;
use crate::web::error::RouterError;
use crate::web::state::AppState;
use axum::{
    extract::{ConnectInfo, Query, State},
    http::{
        header::{HeaderMap, CONTENT_TYPE, LOCATION},
        StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::net::SocketAddr;

/// Query parameters for `/search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Raw search query
    pub q: Option<String>,
    /// Engine for keyword queries
    #[serde(rename = "keywordEngine")]
    pub keyword_engine: Option<String>,
    /// Engine for question queries
    #[serde(rename = "questionEngine")]
    pub question_engine: Option<String>,
}

/// Search handler: the full routing pipeline.
///
/// Rate gate, then sanitize, classify, validate the country signal,
/// resolve the destination, and prove the redirect safe. Any stage that
/// fails maps to a 4xx with a generic body.
pub async fn search(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Response, RouterError> {
    let identity = client_identity(&state, &headers, connect_info);
    if let Decision::Block { retry_after } = state.limiter.check(&identity).await {
        return Err(RouterError::RateLimited { retry_after });
    }

    let sanitized = query::sanitize(params.q.as_deref());
    if sanitized.is_empty() {
        return Err(RouterError::Validation("query empty after sanitization"));
    }

    let intent = query::classify(&sanitized);
    let country = CountryCode::parse(geo_signal(&state, &headers));

    let engine = match intent {
        QueryIntent::Question => engine_or_default(
            params.question_engine.as_deref(),
            state.settings.routing.question_engine,
        ),
        QueryIntent::Keyword => engine_or_default(
            params.keyword_engine.as_deref(),
            state.settings.routing.keyword_engine,
        ),
    };

    let encoded = urlencoding::encode(&sanitized);
    let candidate = engines::resolve(engine, &encoded, &country);

    let target = redirect::validate(&candidate, &state.safe_domains)
        .map_err(|reason| RouterError::Validation(reason.as_str()))?;

    Ok((
        StatusCode::FOUND,
        [(LOCATION, target.as_str().to_string())],
    )
        .into_response())
}

/// Suggestion handler: canned OpenSearch-style suggestions around the
/// sanitized query. Never echoes the raw form.
pub async fn suggest(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(params): Query<SuggestParams>,
) -> Result<Response, RouterError> {
    let identity = client_identity(&state, &headers, connect_info);
    if let Decision::Block { retry_after } = state.limiter.check(&identity).await {
        return Err(RouterError::RateLimited { retry_after });
    }

    let q = query::sanitize(params.q.as_deref());
    let body = serde_json::json!([
        q,
        [
            format!("{} example", q),
            format!("{} help", q),
            format!("{} guide", q)
        ],
        [],
        []
    ]);

    Ok(Json(body).into_response())
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub q: Option<String>,
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "instance": state.instance_name(),
        "version": crate::VERSION
    }))
}

/// Fallback handler: any path the core does not own is delegated to the
/// asset-store collaborator, passed through unchanged.
pub async fn asset(State(state): State<AppState>, uri: Uri) -> Result<Response, RouterError> {
    match state.assets.fetch(uri.path()).await {
        Ok(Some(asset)) => {
            Ok(([(CONTENT_TYPE, asset.content_type)], asset.body).into_response())
        }
        Ok(None) => Err(RouterError::AssetNotFound),
        Err(e) => Err(RouterError::Internal(e)),
    }
}

/// Parse an engine selector, substituting the configured default for a
/// missing or out-of-set value. Resolution itself never sees an unknown
/// name.
fn engine_or_default(selector: Option<&str>, default: EngineName) -> EngineName {
    selector
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Read the inbound geolocation signal, if present.
fn geo_signal<'a>(state: &AppState, headers: &'a HeaderMap) -> Option<&'a str> {
    headers
        .get(state.settings.server.geo_header.as_str())
        .and_then(|v| v.to_str().ok())
}

/// Derive the rate-limiter identity for this request.
fn client_identity(
    state: &AppState,
    headers: &HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> ClientIdentity {
    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
    };

    let connection_ip = connect_info.map(|ConnectInfo(addr)| addr.ip().to_string());

    let ip = match state.settings.server.real_ip_method {
        RealIpMethod::XForwardedFor => header_ip("x-forwarded-for").or(connection_ip),
        RealIpMethod::XRealIp => header_ip("x-real-ip").or(connection_ip),
        RealIpMethod::Connection => connection_ip,
    }
    .unwrap_or_else(|| "unknown".to_string());

    let fragment = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    ClientIdentity::derive(
        &ip,
        fragment("user-agent"),
        fragment("accept-language"),
        fragment("accept-encoding"),
    )
}
