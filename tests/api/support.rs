// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for the HTTP endpoint tests

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgb, RgbImage};
use ndarray::{Array4, ArrayD, IxDyn};
use sat_captcha_solver::models::{InputDimensions, ModelSlot, Recognizer, Vocabulary};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

pub const SAT_VOCAB: &str = "Y65WRD98SMBG3NJ21CP4KF7ZXHVTQL";

/// Recognizer whose scores spell a fixed sequence of class indices
pub struct SpellingRecognizer {
    indices: Vec<usize>,
    classes: usize,
    delay: Option<Duration>,
}

impl SpellingRecognizer {
    /// Spell `text` over `vocab`, separating every symbol with a blank
    pub fn spelling(text: &str, vocab: &str) -> Self {
        let symbols: Vec<char> = vocab.chars().collect();
        let blank = symbols.len();
        let mut indices = vec![blank];
        for c in text.chars() {
            let index = symbols.iter().position(|s| *s == c).unwrap();
            indices.push(index);
            indices.push(blank);
        }
        Self {
            indices,
            classes: symbols.len() + 1,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Recognizer for SpellingRecognizer {
    fn recognize(&self, input: Array4<f32>) -> anyhow::Result<ArrayD<f32>> {
        assert_eq!(input.shape()[0], 1);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let mut scores = ArrayD::<f32>::zeros(IxDyn(&[1, self.indices.len(), self.classes]));
        for (t, &index) in self.indices.iter().enumerate() {
            scores[[0, t, index]] = 1.0;
        }
        Ok(scores)
    }
}

pub struct FailingRecognizer;

impl Recognizer for FailingRecognizer {
    fn recognize(&self, _input: Array4<f32>) -> anyhow::Result<ArrayD<f32>> {
        anyhow::bail!("onnx session failed")
    }
}

pub fn slot(id: &str, vocab: &str, recognizer: impl Recognizer + 'static) -> ModelSlot {
    ModelSlot::new(
        id,
        Vocabulary::new(vocab).unwrap(),
        InputDimensions::new(160, 60, 3).unwrap(),
        Arc::new(recognizer),
    )
}

/// Base64 PNG captcha-sized test image
pub fn png_base64() -> String {
    let image = RgbImage::from_fn(200, 70, |x, y| {
        if (x / 10 + y / 10) % 2 == 0 {
            Rgb([240, 240, 240])
        } else {
            Rgb([20, 40, 160])
        }
    });
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    STANDARD.encode(bytes)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: String) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
