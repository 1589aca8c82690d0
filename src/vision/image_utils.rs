// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Captcha payload decoding
//!
//! The extension posts either bare base64 or a canvas data URI
//! (`data:image/png;base64,...`). Both end up as a BGR [`PixelBuffer`].

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::borrow::Cow;
use thiserror::Error;

use super::pixel_buffer::PixelBuffer;

/// Default maximum decoded image size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

const DATA_URI_SCHEME: &str = "data:";

/// Errors raised while turning a payload into pixels
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Image data is empty")]
    Empty,

    #[error("Data URI has no ',' separator")]
    MalformedDataUri,

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),
}

/// Remove an optional `data:<media-type>[;base64],` prefix
///
/// Everything up to and including the first comma is dropped. Standard
/// base64 never contains ':' so a bare payload cannot start with `data:`.
pub fn strip_data_uri(payload: &str) -> Result<&str, DecodeError> {
    let payload = payload.trim();
    if !payload.starts_with(DATA_URI_SCHEME) {
        return Ok(payload);
    }

    payload
        .split_once(',')
        .map(|(_, data)| data.trim())
        .ok_or(DecodeError::MalformedDataUri)
}

/// Decode a captcha payload with the default size limit
pub fn decode(payload: &str) -> Result<PixelBuffer, DecodeError> {
    decode_with_limit(payload, MAX_IMAGE_SIZE)
}

/// Decode a captcha payload into a BGR pixel buffer
///
/// # Arguments
/// * `payload` - Base64 image, optionally wrapped in a data URI
/// * `max_bytes` - Upper bound on the decoded container size
///
/// # Errors
/// Any failure is a [`DecodeError`]; callers map it to a client error.
pub fn decode_with_limit(payload: &str, max_bytes: usize) -> Result<PixelBuffer, DecodeError> {
    let data = strip_data_uri(payload)?;

    // MIME-wrapped payloads carry line breaks between base64 lines
    let data: Cow<'_, str> = if data.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(data.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    } else {
        Cow::Borrowed(data)
    };

    if data.is_empty() {
        return Err(DecodeError::Empty);
    }

    // base64 expands by 4/3, reject before allocating
    if data.len() / 4 * 3 > max_bytes.saturating_add(3) {
        return Err(DecodeError::TooLarge(data.len() / 4 * 3, max_bytes));
    }

    let bytes = STANDARD.decode(data.as_bytes())?;
    decode_image_bytes(&bytes, max_bytes)
}

/// Decode raw container bytes (PNG, JPEG, ...) into a BGR pixel buffer
pub fn decode_image_bytes(bytes: &[u8], max_bytes: usize) -> Result<PixelBuffer, DecodeError> {
    if bytes.len() > max_bytes {
        return Err(DecodeError::TooLarge(bytes.len(), max_bytes));
    }

    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| DecodeError::DecodeFailed(e.to_string()))?;

    // Alpha is dropped; canvas captures are opaque
    Ok(PixelBuffer::from_rgb(&img.to_rgb8()))
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, DecodeError> {
    if bytes.len() < 4 {
        return Err(DecodeError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        _ => Err(DecodeError::UnsupportedFormat),
    }
}
