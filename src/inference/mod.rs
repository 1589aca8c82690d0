// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod ctc;
pub mod invoker;

pub use ctc::{greedy_decode, CtcDecoded};
pub use invoker::{
    infer, infer_with_timeout, prepare_input, InferenceError, PredictionResult,
    DEFAULT_INFERENCE_TIMEOUT, PLACEHOLDER_CONFIDENCE,
};
