//! HTTP adapters - REST API implementations.
//!
//! `api_router` assembles the session and user routes behind the auth
//! middleware and the tower-http stack (request id, tracing, timeout, CORS).

pub mod middleware;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::ServerErrorsFailureClass,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::Span;

use crate::ports::{Clock, IdGenerator, SessionRepository, SessionValidator};

pub use middleware::{auth_middleware, AuthState, RequireAuth};
pub use session::{session_routes, user_routes, SessionHandlers};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Ports the HTTP surface is built from.
#[derive(Clone)]
pub struct ApiDependencies {
    pub repository: Arc<dyn SessionRepository>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub validator: Arc<dyn SessionValidator>,
}

/// Cross-cutting HTTP settings.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    /// Allowed CORS origins. Empty means no cross-origin access.
    pub cors_origins: Vec<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            cors_origins: Vec::new(),
        }
    }
}

/// Builds the full API router.
pub fn api_router(deps: ApiDependencies, settings: &HttpSettings) -> Router {
    let handlers = SessionHandlers::new(deps.repository, deps.clock, deps.ids);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let api = Router::new()
        .nest("/api/sessions", session_routes(handlers.clone()))
        .nest("/api/users", user_routes(handlers))
        .layer(axum::middleware::from_fn_with_state(
            deps.validator,
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            let request_id = request
                                .headers()
                                .get(REQUEST_ID_HEADER)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or_default();
                            tracing::info_span!(
                                "http_request",
                                request_id = %request_id,
                                method = %request.method(),
                                uri = %request.uri(),
                            )
                        })
                        .on_failure(
                            |error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
                                tracing::error!(
                                    latency_ms = latency.as_millis() as u64,
                                    "request failed: {}",
                                    error
                                );
                            },
                        ),
                )
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(TimeoutLayer::new(settings.request_timeout))
                .layer(cors_layer(&settings.cors_origins)),
        )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
}
