// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use passvault_auth::{JwtAuthenticator, TokenIssuer};
use passvault_config::model::ServerConfig;
use passvault_core::{PassvaultError, StorageAdapter};
use passvault_credentials::CredentialRepository;
use passvault_vault::ProcessKey;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::handlers;

/// Shared state for axum request handlers.
///
/// Everything in here is immutable after startup.
#[derive(Clone)]
pub struct GatewayState {
    /// Owner-scoped record access; holds the process key.
    pub credentials: CredentialRepository,
    /// Login, refresh and bearer validation.
    pub auth: Arc<JwtAuthenticator>,
    /// Backing store, for health checks.
    pub storage: Arc<dyn StorageAdapter>,
}

impl GatewayState {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        key: Arc<ProcessKey>,
        issuer: TokenIssuer,
    ) -> Result<Self, PassvaultError> {
        Ok(Self {
            credentials: CredentialRepository::new(storage.clone(), key),
            auth: Arc::new(JwtAuthenticator::new(storage.clone(), issuer)?),
            storage,
        })
    }
}

/// Build the application router.
///
/// - GET /health and POST /api/token[/refresh] are public
/// - everything under /api/passwords requires a bearer access token
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/token", post(handlers::obtain_token))
        .route("/api/token/refresh", post(handlers::refresh_token))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/api/passwords",
            get(handlers::list_passwords).post(handlers::create_password),
        )
        .route(
            "/api/passwords/{id}",
            get(handlers::get_password)
                .put(handlers::replace_password)
                .patch(handlers::patch_password)
                .delete(handlers::delete_password),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve the API until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), PassvaultError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PassvaultError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| PassvaultError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}
