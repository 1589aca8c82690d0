// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::http_server::AppState;
use crate::models::{ModelRegistry, RoutingPolicy, SlotStatus};

pub const TEST_MESSAGE: &str = "SAT Captcha API funcionando";
pub const ENDPOINTS: [&str; 3] = ["/health", "/solve-captcha", "/test"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelStatus {
    pub id: String,
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocab: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_text_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelStatus {
    fn from_status(status: &SlotStatus, registry: &ModelRegistry) -> Self {
        let slot = status.loaded.then(|| registry.get(&status.id)).flatten();
        Self {
            id: status.id.clone(),
            loaded: status.loaded,
            vocab: slot.as_ref().map(|s| s.vocabulary().as_string()),
            width: slot.as_ref().map(|s| s.input().width),
            height: slot.as_ref().map(|s| s.input().height),
            channels: slot.as_ref().map(|s| s.input().channels),
            max_text_length: slot.as_ref().and_then(|s| s.max_text_length()),
            error: status.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    /// Vocabulary of the slot serving unhinted requests, null when nothing loaded
    pub vocab: Option<String>,
    pub models: Vec<ModelStatus>,
}

impl HealthResponse {
    pub fn from_registry(registry: &ModelRegistry, router: &RoutingPolicy) -> Self {
        let vocab = registry
            .get(router.default_slot())
            .or_else(|| registry.first_loaded())
            .map(|slot| slot.vocabulary().as_string());

        Self {
            status: "ok".to_string(),
            model_loaded: registry.any_loaded(),
            vocab,
            models: registry
                .statuses()
                .iter()
                .map(|status| ModelStatus::from_status(status, registry))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResponse {
    pub message: String,
    pub model_status: String,
    pub endpoints: Vec<String>,
}

impl TestResponse {
    pub fn from_registry(registry: &ModelRegistry) -> Self {
        let model_status = if registry.any_loaded() {
            "loaded"
        } else {
            "not_loaded"
        };
        Self {
            message: TEST_MESSAGE.to_string(),
            model_status: model_status.to_string(),
            endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// GET /health - Model load state
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_registry(&state.registry, &state.router))
}

/// GET /test - Connectivity probe for the browser extension
pub async fn test_handler(State(state): State<AppState>) -> Json<TestResponse> {
    Json(TestResponse::from_registry(&state.registry))
}
