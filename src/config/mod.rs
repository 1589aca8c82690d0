// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration from command-line flags and environment variables

use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::models::{RouteRule, RoutingPolicy, SlotConfig, DEFAULT_SLOT};
use crate::vision::image_utils::MAX_IMAGE_SIZE;

/// SAT captcha solving service
#[derive(Parser, Debug, Clone)]
#[command(name = "sat-captcha-solver")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "HTTP service that solves SAT captchas with CTC recognition models", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "API_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Model slots as ID=DIR, each DIR holding a configs.toml
    #[arg(
        long = "model",
        env = "CAPTCHA_MODELS",
        value_delimiter = ',',
        default_values = ["color=./model", "gray=./model_gris"]
    )]
    pub models: Vec<SlotConfig>,

    /// Ordered routing rules as MARKER=SLOT, matched against the pageType hint
    #[arg(
        long = "route",
        env = "CAPTCHA_ROUTES",
        value_delimiter = ',',
        default_values = ["gris=gray", "gray=gray", "cfdi=gray"]
    )]
    pub routes: Vec<RouteRule>,

    /// Slot used when no rule matches and as the first fallback
    #[arg(long, env = "CAPTCHA_DEFAULT_SLOT", default_value = DEFAULT_SLOT)]
    pub default_slot: String,

    /// Upper bound on one recognizer call in milliseconds
    #[arg(long, env = "INFERENCE_TIMEOUT_MS", default_value_t = 10_000)]
    pub inference_timeout_ms: u64,

    /// Largest accepted decoded image in bytes
    #[arg(long, env = "MAX_IMAGE_BYTES", default_value_t = MAX_IMAGE_SIZE)]
    pub max_image_bytes: usize,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn routing_policy(&self) -> RoutingPolicy {
        RoutingPolicy::new(self.routes.clone(), self.default_slot.clone())
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }
}
