// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod inference;
pub mod models;
pub mod version;
pub mod vision;

// Re-export main types
pub use api::{create_router, AppState, SolveError};
pub use config::ServerConfig;
pub use inference::{InferenceError, PredictionResult};
pub use models::{ModelRegistry, ModelSlot, Recognizer, RoutingPolicy, Vocabulary};
pub use vision::{DecodeError, PixelBuffer};
