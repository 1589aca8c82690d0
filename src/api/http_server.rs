// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers::{health_handler, test_handler};
use super::solve::solve_handler;
use crate::inference::DEFAULT_INFERENCE_TIMEOUT;
use crate::models::{ModelRegistry, RoutingPolicy};
use crate::vision::image_utils::MAX_IMAGE_SIZE;

/// Headroom for the JSON envelope and a data URI prefix
const BODY_OVERHEAD: usize = 4 * 1024;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub router: Arc<RoutingPolicy>,
    pub inference_timeout: Duration,
    /// Decoded image size limit in bytes
    pub max_image_bytes: usize,
}

impl AppState {
    pub fn new(
        registry: ModelRegistry,
        router: RoutingPolicy,
        inference_timeout: Duration,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            router: Arc::new(router),
            inference_timeout,
            max_image_bytes,
        }
    }

    /// State with the default routing policy and limits
    pub fn new_for_test(registry: ModelRegistry) -> Self {
        Self::new(
            registry,
            RoutingPolicy::default(),
            DEFAULT_INFERENCE_TIMEOUT,
            MAX_IMAGE_SIZE,
        )
    }

    /// Request body limit: the image limit in base64 bytes plus the envelope
    pub fn body_limit(&self) -> usize {
        self.max_image_bytes.div_ceil(3) * 4 + BODY_OVERHEAD
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.body_limit();

    Router::new()
        // Model load state
        .route("/health", get(health_handler))
        // Captcha solving
        .route("/solve-captcha", post(solve_handler))
        // Connectivity probe
        .route("/test", get(test_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🌐 Captcha API listening on http://{}", addr);
    info!("   - GET  /health - Model status");
    info!("   - POST /solve-captcha - Solve captcha");
    info!("   - GET  /test - Connectivity check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Captcha API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
