//! HTTP server setup and the proxy pipeline.
//!
//! # Responsibilities
//! - Create the Axum Router (`/ping`, `/proxy`)
//! - Wire up middleware (request ID, tracing, auth, rate limit)
//! - Run the `/proxy` pipeline: URL → allowlist → CORS → preflight →
//!   header sanitizing → forward → relay
//! - Serve until the shutdown signal, then drain

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{Method, Request},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::{ProxyError, ServerError};
use crate::http::client::ForwardingClient;
use crate::http::cors::CorsPolicy;
use crate::http::request::{self, Target, UuidRequestId};
use crate::http::response;
use crate::observability::metrics;
use crate::security::{
    auth_middleware, rate_limit_middleware, sanitize_request_headers, AuthGate, DomainFilter,
    RateGate,
};

/// Application state injected into handlers. Built once from the config snapshot.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub rate_gate: Arc<RateGate>,
    pub domains: Arc<DomainFilter>,
    pub cors: Arc<CorsPolicy>,
    pub client: ForwardingClient,
}

impl AppState {
    pub fn new(config: &ProxyConfig) -> Result<Self, ServerError> {
        let auth = AuthGate::new(config.auth_key(), &config.security.auth_header)
            .map_err(|e| ServerError::Config(format!("security.auth_header: {}", e)))?;
        let cors = CorsPolicy::new(&config.cors.default_origin, auth.is_enabled())
            .map_err(|e| ServerError::Config(format!("cors.default_origin: {}", e)))?;

        Ok(Self {
            auth: Arc::new(auth),
            rate_gate: Arc::new(RateGate::new(config.security.rate_limit)),
            domains: Arc::new(DomainFilter::new(&config.security.allowed_domains)),
            cors: Arc::new(cors),
            client: ForwardingClient::new(&config.upstream)?,
        })
    }
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let state = AppState::new(&config)?;
        Ok(Self {
            router: Self::build_router(state),
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// On `/proxy` the auth layer is outermost so it runs before the rate gate.
    /// Caller-sent request IDs are tagged before one is generated, so only those
    /// are forwarded upstream.
    fn build_router(state: AppState) -> Router {
        let proxy = any(proxy_handler)
            .layer(middleware::from_fn_with_state(
                state.rate_gate.clone(),
                rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(state.auth.clone(), auth_middleware));

        Router::new()
            .route("/ping", get(ping))
            .route("/proxy", proxy)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn(request::tag_caller_request_id))
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The configured router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Liveness check.
async fn ping() -> impl IntoResponse {
    Json(json!({ "message": "pong" }))
}

/// `/proxy` handler. Auth and rate limiting have already run as middleware.
async fn proxy_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    let response = match proxy(&state, query, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start);
    response
}

async fn proxy(
    state: &AppState,
    query: Option<String>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let raw_target = request::target_param(query.as_deref())?;
    let target = Target::parse(&raw_target)?;
    state.domains.check(target.hostname())?;

    let origin = state.cors.resolve_origin(request.headers());
    let cors_headers = state.cors.headers_for(origin);

    if request.method() == Method::OPTIONS {
        return Ok(response::preflight(cors_headers));
    }

    let (parts, body) = request.into_parts();
    tracing::debug!(
        request_id = %request::request_id(&parts.headers),
        method = %parts.method,
        url = %target.url(),
        "Proxying request"
    );

    let mut headers = sanitize_request_headers(&parts.headers);
    request::strip_generated_request_id(&mut headers, &parts.extensions);
    let upstream = state
        .client
        .forward(parts.method, target.into_url(), headers, body)
        .await?;

    tracing::debug!(status = %upstream.status(), "Upstream responded");
    Ok(response::relay(upstream, cors_headers))
}
