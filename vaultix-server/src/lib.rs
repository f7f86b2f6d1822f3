pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use vaultix_core::error::AppError;
use vaultix_core::middleware::security_headers::security_headers_middleware;

use crate::config::ServerConfig;
use crate::services::{
    AuthService, Clock, FlatFileStore, OtpDelivery, OtpSessionStore, TokenService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub store: Arc<FlatFileStore>,
    pub tokens: TokenService,
    pub auth: AuthService,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        store: Arc<FlatFileStore>,
        sessions: Arc<dyn OtpSessionStore>,
        delivery: Arc<dyn OtpDelivery>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = TokenService::new(
            config.auth.signing_secret.clone(),
            config.auth.access_token_expiry_minutes,
            clock.clone(),
        );
        let auth = AuthService::new(
            store.clone(),
            sessions,
            tokens.clone(),
            delivery,
            clock.clone(),
            config.auth.otp_session_ttl_minutes,
            config.auth.expose_demo_otp,
        );
        Self {
            config,
            store,
            tokens,
            auth,
            clock,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Everything past the handshake requires an authenticated-stage bearer.
    let protected = Router::new()
        .route("/api/profile", get(handlers::profile::get_profile))
        .route("/api/profile", put(handlers::profile::update_profile))
        .route("/api/settings", get(handlers::settings::get_settings))
        .route("/api/settings", put(handlers::settings::update_settings))
        .route("/api/dashboard/:view", get(handlers::dashboard::dashboard))
        .route("/api/files", get(handlers::files::list_files))
        .route("/api/files", post(handlers::files::create_file))
        .route(
            "/api/access-requests",
            get(handlers::access_requests::list_requests),
        )
        .route(
            "/api/access-requests",
            post(handlers::access_requests::create_request),
        )
        .route(
            "/api/access-requests/:id",
            patch(handlers::access_requests::decide_request),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/verify-otp", post(handlers::auth::verify_otp))
        .route("/api/analytics", get(handlers::analytics::analytics))
        .merge(protected)
        .with_state(state.clone())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(security_headers_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .filter_map(|o| match o.parse::<HeaderValue>() {
                            Ok(value) => Some(value),
                            Err(e) => {
                                tracing::error!(origin = %o, error = %e, "Invalid CORS origin, skipping");
                                None
                            }
                        })
                        .collect::<Vec<HeaderValue>>(),
                )
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        )
}

/// Service health check. Verifies the backing store file is reachable.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Store health check failed");
        AppError::StorageError(anyhow::anyhow!(e))
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
    })))
}
