// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Inference invoker: adapts a decoded captcha to a slot's recognizer
//!
//! The invoker resizes the image to the slot's input shape, builds the NHWC
//! tensor, calls the recognizer and decodes its scores over the slot
//! vocabulary. The recognizer does the numeric work.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb};
use ndarray::{Array4, Ix3};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use super::ctc::greedy_decode;
use crate::models::{InputDimensions, ModelSlot};
use crate::vision::PixelBuffer;

/// Confidence reported with every prediction
///
/// The CTC models expose no calibrated certainty, so this is a fixed
/// placeholder and not an estimate. `PredictionResult::mean_score` carries
/// the raw decoder signal.
pub const PLACEHOLDER_CONFIDENCE: f32 = 0.95;

/// Default bound on one recognizer call
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures of the recognition step
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("invalid input image: {0}")]
    InvalidInput(String),

    #[error("recognizer failed: {0}")]
    Runtime(String),

    #[error("unexpected output shape {0:?}, expected [1, timesteps, classes]")]
    OutputShape(Vec<usize>),

    #[error("model emits {actual} classes but vocabulary needs {expected}")]
    VocabularyMismatch { expected: usize, actual: usize },

    #[error("recognizer did not answer within {0:?}")]
    Timeout(Duration),

    #[error("inference task aborted: {0}")]
    Aborted(String),
}

/// Decoded captcha answer
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    /// Text over the serving slot's vocabulary
    pub text: String,
    /// Always [`PLACEHOLDER_CONFIDENCE`]
    pub confidence: f32,
    /// Mean winning CTC score over emitted characters
    pub mean_score: f32,
    /// Slot that produced the prediction
    pub slot_id: String,
    pub processing_time_ms: u64,
}

/// Build the `[1, H, W, C]` tensor a slot expects
///
/// The image is scaled (bilinear, no crop, aspect ratio not preserved) to
/// the slot's width and height. Single-channel slots receive BGR luma.
/// Values stay in 0-255; the exported models normalize internally.
pub fn prepare_input(
    buffer: &PixelBuffer,
    input: InputDimensions,
) -> Result<Array4<f32>, InferenceError> {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return Err(InferenceError::InvalidInput(format!(
            "image has zero size ({}x{})",
            width, height
        )));
    }

    // Channel order is irrelevant to scaling, so BGR bytes ride in an Rgb buffer
    let image: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, buffer.as_bytes().to_vec()).ok_or_else(|| {
            InferenceError::InvalidInput("pixel data does not match dimensions".to_string())
        })?;

    let resized = if (width, height) == (input.width, input.height) {
        image
    } else {
        imageops::resize(&image, input.width, input.height, FilterType::Triangle)
    };

    let channels = input.channels as usize;
    let mut tensor = Array4::<f32>::zeros((1, input.height as usize, input.width as usize, channels));

    for (x, y, pixel) in resized.enumerate_pixels() {
        let [b, g, r] = pixel.0;
        let (x, y) = (x as usize, y as usize);
        if channels == 1 {
            tensor[[0, y, x, 0]] = 0.114 * b as f32 + 0.587 * g as f32 + 0.299 * r as f32;
        } else {
            tensor[[0, y, x, 0]] = b as f32;
            tensor[[0, y, x, 1]] = g as f32;
            tensor[[0, y, x, 2]] = r as f32;
        }
    }

    Ok(tensor)
}

/// Run one slot on one image
///
/// # Errors
/// [`InferenceError`] when the recognizer fails or its output does not
/// match the slot vocabulary.
pub fn infer(buffer: &PixelBuffer, slot: &ModelSlot) -> Result<PredictionResult, InferenceError> {
    let start = Instant::now();
    let input = prepare_input(buffer, slot.input())?;

    let scores = slot
        .handle()
        .recognize(input)
        .map_err(|e| InferenceError::Runtime(format!("{:#}", e)))?;

    let shape = scores.shape().to_vec();
    let scores = scores
        .into_dimensionality::<Ix3>()
        .map_err(|_| InferenceError::OutputShape(shape.clone()))?;
    if scores.shape()[0] != 1 {
        return Err(InferenceError::OutputShape(shape));
    }

    let vocabulary = slot.vocabulary();
    let classes = scores.shape()[2];
    if classes != vocabulary.class_count() {
        return Err(InferenceError::VocabularyMismatch {
            expected: vocabulary.class_count(),
            actual: classes,
        });
    }

    let decoded = greedy_decode(scores.index_axis(ndarray::Axis(0), 0), vocabulary);
    let processing_time_ms = start.elapsed().as_millis() as u64;

    debug!(
        "Slot '{}' decoded '{}' (mean score {:.3}, {}ms)",
        slot.id(),
        decoded.text,
        decoded.mean_score,
        processing_time_ms
    );

    Ok(PredictionResult {
        text: decoded.text,
        confidence: PLACEHOLDER_CONFIDENCE,
        mean_score: decoded.mean_score,
        slot_id: slot.id().to_string(),
        processing_time_ms,
    })
}

/// Run [`infer`] on the blocking pool, giving up after `bound`
///
/// An expired bound returns [`InferenceError::Timeout`]; the blocking call
/// itself cannot be interrupted and finishes in the background.
pub async fn infer_with_timeout(
    buffer: PixelBuffer,
    slot: Arc<ModelSlot>,
    bound: Duration,
) -> Result<PredictionResult, InferenceError> {
    let task = tokio::task::spawn_blocking(move || infer(&buffer, &slot));

    match tokio::time::timeout(bound, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(InferenceError::Aborted(join_error.to_string())),
        Err(_) => Err(InferenceError::Timeout(bound)),
    }
}
