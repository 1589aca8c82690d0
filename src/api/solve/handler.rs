// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Solve endpoint handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{debug, info, warn};

use super::request::SolveRequest;
use super::response::SolveResponse;
use crate::api::errors::SolveError;
use crate::api::http_server::AppState;
use crate::inference::infer_with_timeout;
use crate::vision::decode_with_limit;

/// POST /solve-captcha - Decode the text of a captcha image
///
/// # Request
/// - `image`: Base64 image, optionally as a `data:image/...;base64,` URI (required)
/// - `pageType`: Page category hint used for model routing (optional, defaults to "color")
///
/// # Response
/// - `success`: Always true
/// - `prediction`: Decoded captcha text
/// - `confidence`: Fixed placeholder (0.95)
/// - `model`: Slot that produced the prediction
///
/// # Errors
/// - 500 Internal Server Error: No model loaded (checked before the body), inference failed or timed out
/// - 400 Bad Request: Malformed body, missing image, undecodable image
pub async fn solve_handler(
    State(state): State<AppState>,
    payload: Result<Json<SolveRequest>, JsonRejection>,
) -> Result<Json<SolveResponse>, SolveError> {
    // 0. Nothing can be solved without a model, whatever the input
    if !state.registry.any_loaded() {
        return Err(SolveError::NoModelAvailable);
    }

    // 1. Parse body
    let Json(request) = payload.map_err(|rejection| {
        SolveError::Validation(format!("Solicitud inválida: {}", rejection.body_text()))
    })?;

    // 2. Validate
    let image = request.validate()?;
    debug!(
        "Solve request received (pageType: {:?}, {} payload bytes)",
        request.page_type,
        image.len()
    );

    // 3. Decode image
    let buffer = decode_with_limit(image, state.max_image_bytes)?;
    debug!("Decoded image: {}x{}", buffer.width(), buffer.height());

    // 4. Route
    let selection = state
        .router
        .select(request.page_type.as_deref(), &state.registry)?;
    if selection.fell_back {
        warn!(
            "Model slot '{}' not loaded, falling back to '{}'",
            selection.preferred,
            selection.slot.id()
        );
    }

    // 5. Infer
    let result = infer_with_timeout(buffer, selection.slot, state.inference_timeout).await?;

    info!(
        "🎯 Captcha solved with '{}': {} ({}ms, mean score {:.3})",
        result.slot_id, result.text, result.processing_time_ms, result.mean_score
    );

    Ok(Json(SolveResponse::from(result)))
}
