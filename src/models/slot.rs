// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model slots: one loaded recognition model with its vocabulary and input shape

use ndarray::{Array4, ArrayD};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while assembling a slot from its configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("vocabulary is empty")]
    EmptyVocabulary,

    #[error("vocabulary repeats symbol '{0}'")]
    DuplicateSymbol(char),

    #[error("invalid input dimensions {width}x{height}x{channels} (channels must be 1 or 3)")]
    InvalidDimensions {
        width: u32,
        height: u32,
        channels: u32,
    },
}

/// External recognition capability behind a slot
///
/// Implementations take a single NHWC image `[1, H, W, C]` with raw 0-255
/// values and return per-timestep class scores, nominally `[1, T, classes]`.
/// Shape checking against the vocabulary is left to the caller.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, input: Array4<f32>) -> anyhow::Result<ArrayD<f32>>;

    /// Number of output classes when the model declares a static shape
    fn output_classes(&self) -> Option<usize> {
        None
    }
}

/// Ordered alphabet used to turn class indices into characters
///
/// Index `len()` is reserved for the CTC blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    symbols: Vec<char>,
}

impl Vocabulary {
    pub fn new(symbols: &str) -> Result<Self, SlotError> {
        let symbols: Vec<char> = symbols.chars().collect();
        if symbols.is_empty() {
            return Err(SlotError::EmptyVocabulary);
        }

        let mut seen = HashSet::with_capacity(symbols.len());
        for &symbol in &symbols {
            if !seen.insert(symbol) {
                return Err(SlotError::DuplicateSymbol(symbol));
            }
        }

        Ok(Self { symbols })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Index of the CTC blank class
    pub fn blank_index(&self) -> usize {
        self.symbols.len()
    }

    /// Number of classes a matching model must emit (symbols + blank)
    pub fn class_count(&self) -> usize {
        self.symbols.len() + 1
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }

    pub fn as_string(&self) -> String {
        self.symbols.iter().collect()
    }
}

/// Width, height and channel count a slot expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputDimensions {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
}

impl InputDimensions {
    pub fn new(width: u32, height: u32, channels: u32) -> Result<Self, SlotError> {
        if width == 0 || height == 0 || !(channels == 1 || channels == 3) {
            return Err(SlotError::InvalidDimensions {
                width,
                height,
                channels,
            });
        }
        Ok(Self {
            width,
            height,
            channels,
        })
    }
}

/// A fully loaded, immutable recognition model
///
/// Slots only exist for models that loaded; a failed load never produces one.
#[derive(Clone)]
pub struct ModelSlot {
    id: String,
    vocabulary: Vocabulary,
    input: InputDimensions,
    max_text_length: Option<usize>,
    handle: Arc<dyn Recognizer>,
}

impl std::fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSlot")
            .field("id", &self.id)
            .field("vocabulary", &self.vocabulary.as_string())
            .field("input", &self.input)
            .field("max_text_length", &self.max_text_length)
            .finish_non_exhaustive()
    }
}

impl ModelSlot {
    pub fn new(
        id: impl Into<String>,
        vocabulary: Vocabulary,
        input: InputDimensions,
        handle: Arc<dyn Recognizer>,
    ) -> Self {
        Self {
            id: id.into(),
            vocabulary,
            input,
            max_text_length: None,
            handle,
        }
    }

    pub fn with_max_text_length(mut self, max_text_length: Option<usize>) -> Self {
        self.max_text_length = max_text_length;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn input(&self) -> InputDimensions {
        self.input
    }

    pub fn max_text_length(&self) -> Option<usize> {
        self.max_text_length
    }

    pub fn handle(&self) -> &Arc<dyn Recognizer> {
        &self.handle
    }
}
