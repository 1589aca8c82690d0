// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image ingestion for captcha solving
//!
//! This module provides:
//! - Payload decoding (bare base64 or data URI) via `image_utils`
//! - The canonical BGR `PixelBuffer` consumed by the inference invoker

pub mod image_utils;
pub mod pixel_buffer;

pub use image_utils::{decode, decode_with_limit, detect_format, strip_data_uri, DecodeError};
pub use pixel_buffer::PixelBuffer;
