// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use sat_captcha_solver::{
    api::{start_server, AppState},
    config::ServerConfig,
    models::ModelRegistry,
    version,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();

    info!("🚀 Starting {}", version::get_version_string());
    info!("📦 BUILD VERSION: {}", version::VERSION);
    info!("Features: {}", version::FEATURES.join(", "));

    for slot in &config.models {
        info!("Configured model slot {}", slot);
    }
    let registry = ModelRegistry::load_all(&config.models);

    let state = AppState::new(
        registry,
        config.routing_policy(),
        config.inference_timeout(),
        config.max_image_bytes,
    );

    start_server(config.listen_addr(), state).await
}
