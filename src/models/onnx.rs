// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime backend for captcha recognition models
//!
//! The Keras CTC models are exported with a single NHWC float input
//! (`[None, 60, 160, 3]` for both SAT models) and a softmax output of
//! shape `[batch, timesteps, vocab + 1]`.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array4, ArrayD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Value, ValueType};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::slot::Recognizer;

/// Intra-op threads per session; captchas are tiny
const INTRA_THREADS: usize = 2;

/// Captcha recognition model backed by an ONNX Runtime session
///
/// `Session::run` needs exclusive access, so calls into one slot are
/// serialized through the mutex. Separate slots run independently.
pub struct OnnxRecognizer {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    /// Static class dimension of the output, when the graph declares one
    output_classes: Option<usize>,
}

impl std::fmt::Debug for OnnxRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxRecognizer")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("output_classes", &self.output_classes)
            .finish_non_exhaustive()
    }
}

impl OnnxRecognizer {
    /// Load a recognition model from an ONNX file
    ///
    /// # Errors
    /// Returns error if the file is missing or ONNX Runtime rejects it.
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!("Recognition model not found: {}", model_path.display());
        }

        info!("Loading recognition model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(INTRA_THREADS)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!(
                    "Failed to load recognition model from {}",
                    model_path.display()
                )
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| anyhow!("Recognition model declares no inputs"))?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| anyhow!("Recognition model declares no outputs"))?;

        let output_classes = session.outputs.first().and_then(|output| match &output.output_type {
            ValueType::Tensor { shape, .. } => shape
                .iter()
                .last()
                .copied()
                .filter(|&dim| dim > 0)
                .map(|dim| dim as usize),
            _ => None,
        });

        if let Some(input) = session.inputs.first() {
            debug!("Recognition model expected input: {:?}", input.input_type);
        }
        debug!(
            "Recognition model loaded - input: {}, output: {} ({:?} classes)",
            input_name, output_name, output_classes
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            output_classes,
        })
    }

    /// Loader used by the registry for production slots
    pub fn load_shared(model_path: &Path) -> Result<Arc<dyn Recognizer>> {
        Ok(Arc::new(Self::load(model_path)?))
    }
}

impl Recognizer for OnnxRecognizer {
    fn recognize(&self, input: Array4<f32>) -> Result<ArrayD<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Recognition session lock poisoned"))?;

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Recognition inference failed")?;

        let scores = outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("Recognition output shape: {:?}", scores.shape());

        Ok(scores.to_owned())
    }

    fn output_classes(&self) -> Option<usize> {
        self.output_classes
    }
}
