// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Solve request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::SolveError;

/// Message returned when no image is sent
pub const IMAGE_REQUIRED: &str = "Imagen requerida";

/// Request to solve one captcha
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    /// Base64 image, optionally wrapped in a `data:` URI
    #[serde(default)]
    pub image: Option<String>,

    /// Page category hint ("color", "gris", "cfdi", ...)
    #[serde(default)]
    pub page_type: Option<String>,
}

impl SolveRequest {
    /// Check that an image was sent and hand it back
    ///
    /// An empty string passes here and fails later in the decoder.
    pub fn validate(&self) -> Result<&str, SolveError> {
        self.image
            .as_deref()
            .ok_or_else(|| SolveError::Validation(IMAGE_REQUIRED.to_string()))
    }
}
