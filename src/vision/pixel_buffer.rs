// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Canonical pixel buffer handed from the decoder to the inference invoker

use image::{Rgb, RgbImage};

/// Number of interleaved channels in a [`PixelBuffer`]
pub const BUFFER_CHANNELS: usize = 3;

/// Decoded captcha image in blue-green-red order, 8 bits per channel
///
/// The recognition models were trained on OpenCV frames, so the decoder
/// reorders the image library's RGB output into BGR once, here, and every
/// later stage works on BGR bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    /// Row-major BGR bytes, `width * height * 3` long
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Build a buffer from raw BGR bytes
    ///
    /// Returns `None` when `data` does not hold exactly `width * height * 3` bytes.
    pub fn from_bgr(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * BUFFER_CHANNELS;
        if data.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Reorder an RGB image into a BGR buffer
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let mut data = Vec::with_capacity(width as usize * height as usize * BUFFER_CHANNELS);
        for pixel in image.pixels() {
            let [r, g, b] = pixel.0;
            data.extend_from_slice(&[b, g, r]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Convert back to an RGB image
    pub fn to_rgb(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let [b, g, r] = self.bgr_at(x, y);
            Rgb([r, g, b])
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw BGR bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// BGR triple at (x, y)
    ///
    /// Panics when the coordinate lies outside the buffer.
    pub fn bgr_at(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = (y as usize * self.width as usize + x as usize) * BUFFER_CHANNELS;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }
}
