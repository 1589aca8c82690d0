// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::inference::InferenceError;
use crate::models::RouteError;
use crate::vision::DecodeError;

/// Body of every failed response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failure of the solve pipeline, one variant per stage
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("{0}")]
    Validation(String),

    #[error("Imagen inválida: {0}")]
    Decode(#[from] DecodeError),

    #[error("Modelo no disponible")]
    NoModelAvailable,

    #[error("Error de inferencia: {0}")]
    Inference(#[from] InferenceError),
}

impl From<RouteError> for SolveError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::NoModelAvailable => SolveError::NoModelAvailable,
        }
    }
}

impl SolveError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SolveError::Validation(_) | SolveError::Decode(_) => StatusCode::BAD_REQUEST,
            SolveError::NoModelAvailable | SolveError::Inference(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for SolveError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!("❌ Captcha request failed ({}): {}", status.as_u16(), self);
        (status, Json(self.to_response())).into_response()
    }
}
