// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model registry: every slot the service was configured with, loaded once
//! at startup and read-only afterwards

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::config::{ModelFileConfig, SlotConfig};
use super::onnx::OnnxRecognizer;
use super::slot::{InputDimensions, ModelSlot, Recognizer, Vocabulary};

/// Outcome of loading one configured slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStatus {
    pub id: String,
    pub loaded: bool,
    pub error: Option<String>,
}

/// Loaded model slots plus the load outcome of every configured slot
///
/// Built before the server starts and shared behind an `Arc`; nothing
/// mutates it afterwards, so request handlers read it without locking.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    /// Loaded slots in load order
    slots: Vec<Arc<ModelSlot>>,
    /// One entry per configured slot, in configuration order
    statuses: Vec<SlotStatus>,
}

impl ModelRegistry {
    /// Registry with nothing configured
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a registry from slots that are already constructed
    ///
    /// A slot whose id is already taken is recorded as failed.
    pub fn from_slots(slots: Vec<ModelSlot>) -> Self {
        let mut registry = Self::empty();
        for slot in slots {
            registry.insert(slot);
        }
        registry
    }

    /// Load every configured slot with the ONNX Runtime backend
    pub fn load_all(configs: &[SlotConfig]) -> Self {
        Self::load_all_with(configs, OnnxRecognizer::load_shared)
    }

    /// Load every configured slot with a caller-supplied recognizer loader
    ///
    /// Each slot loads in isolation: a failure is logged and recorded in
    /// [`ModelRegistry::statuses`] and never stops the remaining slots.
    pub fn load_all_with<F>(configs: &[SlotConfig], loader: F) -> Self
    where
        F: Fn(&Path) -> Result<Arc<dyn Recognizer>>,
    {
        info!("Loading {} captcha model slot(s)", configs.len());

        let mut registry = Self::empty();
        for config in configs {
            if registry.statuses.iter().any(|s| s.id == config.id) {
                registry.record_failure(&config.id, "duplicate slot id".to_string());
                continue;
            }

            match Self::load_slot(config, &loader) {
                Ok(slot) => {
                    info!(
                        "✅ Model slot '{}' loaded from {} (vocab: {}, input: {}x{}x{})",
                        config.id,
                        config.dir.display(),
                        slot.vocabulary().as_string(),
                        slot.input().width,
                        slot.input().height,
                        slot.input().channels
                    );
                    registry.insert(slot);
                }
                Err(e) => {
                    registry.record_failure(&config.id, format!("{:#}", e));
                }
            }
        }

        if registry.any_loaded() {
            info!(
                "Model registry ready: {}/{} slot(s) loaded",
                registry.slots.len(),
                registry.statuses.len()
            );
        } else {
            warn!("⚠️ No captcha model loaded; /solve-captcha will fail until fixed");
        }

        registry
    }

    fn load_slot<F>(config: &SlotConfig, loader: &F) -> Result<ModelSlot>
    where
        F: Fn(&Path) -> Result<Arc<dyn Recognizer>>,
    {
        let file_config = ModelFileConfig::load(&config.dir)?;

        let vocabulary = Vocabulary::new(&file_config.vocab).context("Invalid vocab")?;
        let input = InputDimensions::new(
            file_config.width,
            file_config.height,
            file_config.channels,
        )
        .context("Invalid input dimensions")?;

        let model_path = file_config.resolve_model_path(&config.dir);
        let handle = loader(&model_path)?;

        if let Some(classes) = handle.output_classes() {
            if classes != vocabulary.class_count() {
                anyhow::bail!(
                    "Model emits {} classes but vocab needs {} (symbols + blank)",
                    classes,
                    vocabulary.class_count()
                );
            }
        }

        Ok(ModelSlot::new(config.id.clone(), vocabulary, input, handle)
            .with_max_text_length(file_config.max_text_length))
    }

    fn insert(&mut self, slot: ModelSlot) {
        if self.is_loaded(slot.id()) {
            self.record_failure(slot.id(), "duplicate slot id".to_string());
            return;
        }
        self.statuses.push(SlotStatus {
            id: slot.id().to_string(),
            loaded: true,
            error: None,
        });
        self.slots.push(Arc::new(slot));
    }

    fn record_failure(&mut self, id: &str, error: String) {
        warn!("⚠️ Failed to load model slot '{}': {}", id, error);
        self.statuses.push(SlotStatus {
            id: id.to_string(),
            loaded: false,
            error: Some(error),
        });
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.slots.iter().any(|slot| slot.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<ModelSlot>> {
        self.slots.iter().find(|slot| slot.id() == id).cloned()
    }

    pub fn any_loaded(&self) -> bool {
        !self.slots.is_empty()
    }

    /// First loaded slot in load order
    pub fn first_loaded(&self) -> Option<Arc<ModelSlot>> {
        self.slots.first().cloned()
    }

    pub fn slots(&self) -> &[Arc<ModelSlot>] {
        &self.slots
    }

    pub fn statuses(&self) -> &[SlotStatus] {
        &self.statuses
    }
}
