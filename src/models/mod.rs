// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Captcha recognition models
//!
//! Components:
//! - `slot` - An immutable loaded model with its vocabulary and input shape
//! - `config` - Slot directories and their `configs.toml`
//! - `registry` - Startup loading with per-slot failure isolation
//! - `router` - `pageType` hint to slot selection with fallback
//! - `onnx` - ONNX Runtime recognizer backend

pub mod config;
pub mod onnx;
pub mod registry;
pub mod router;
pub mod slot;

pub use config::{ModelFileConfig, SlotConfig, MODEL_CONFIG_FILE};
pub use onnx::OnnxRecognizer;
pub use registry::{ModelRegistry, SlotStatus};
pub use router::{RouteError, RouteRule, RoutingPolicy, Selection, DEFAULT_SLOT, GRAY_SLOT};
pub use slot::{InputDimensions, ModelSlot, Recognizer, SlotError, Vocabulary};
