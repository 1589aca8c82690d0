// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Greedy (best path) CTC decoding

use ndarray::ArrayView2;

use crate::models::Vocabulary;

/// Text recovered from one score matrix
#[derive(Debug, Clone, PartialEq)]
pub struct CtcDecoded {
    pub text: String,
    /// Mean of the winning score at every emitted character (0.0 when empty)
    pub mean_score: f32,
}

/// Decode a `[timesteps, classes]` score matrix
///
/// Takes the argmax per step, collapses consecutive repeats, then drops
/// every index outside the vocabulary (the blank is `vocabulary.len()`).
/// A symbol repeated across a blank is kept twice.
pub fn greedy_decode(scores: ArrayView2<'_, f32>, vocabulary: &Vocabulary) -> CtcDecoded {
    let mut text = String::new();
    let mut emitted_scores = Vec::new();
    let mut prev_index: Option<usize> = None;

    for step in scores.rows() {
        let mut max_score = f32::NEG_INFINITY;
        let mut max_index = 0usize;
        for (index, &score) in step.iter().enumerate() {
            if score > max_score {
                max_score = score;
                max_index = index;
            }
        }

        if prev_index != Some(max_index) {
            if let Some(symbol) = vocabulary.get(max_index) {
                text.push(symbol);
                emitted_scores.push(max_score);
            }
        }
        prev_index = Some(max_index);
    }

    let mean_score = if emitted_scores.is_empty() {
        0.0
    } else {
        emitted_scores.iter().sum::<f32>() / emitted_scores.len() as f32
    };

    CtcDecoded { text, mean_score }
}
