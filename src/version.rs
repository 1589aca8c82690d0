// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the SAT captcha solver

/// Full version string with feature description
pub const VERSION: &str = "v2.0.0-multi-model-2025-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = "2.0.0";

/// Major version number
pub const VERSION_MAJOR: u32 = 2;

/// Minor version number
pub const VERSION_MINOR: u32 = 0;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2025-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "multi-model",
    "page-type-routing",
    "gray-fallback",
    "data-uri-payloads",
    "onnx-runtime",
    "ctc-greedy-decoding",
    "inference-timeout",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("SAT Captcha Solver {} ({})", VERSION_NUMBER, BUILD_DATE)
}
