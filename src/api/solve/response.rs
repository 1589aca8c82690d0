// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Solve response types

use serde::{Deserialize, Serialize};

use crate::inference::PredictionResult;

/// Successful captcha answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolveResponse {
    /// Always true; failures use the error body instead
    pub success: bool,
    pub prediction: String,
    /// Fixed placeholder, not a calibrated probability
    pub confidence: f32,
    /// Slot that served the request
    pub model: String,
}

impl From<PredictionResult> for SolveResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            success: true,
            prediction: result.text,
            confidence: result.confidence,
            model: result.slot_id,
        }
    }
}
