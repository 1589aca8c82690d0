// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model registry loading tests
//!
//! Each slot directory is a temp dir with a configs.toml; the recognizer
//! loader is replaced so no ONNX Runtime is needed.

use anyhow::Result;
use ndarray::{Array4, ArrayD, IxDyn};
use sat_captcha_solver::models::{ModelRegistry, Recognizer, SlotConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const SAT_VOCAB: &str = "Y65WRD98SMBG3NJ21CP4KF7ZXHVTQL";

struct StaticRecognizer {
    classes: Option<usize>,
}

impl Recognizer for StaticRecognizer {
    fn recognize(&self, _input: Array4<f32>) -> Result<ArrayD<f32>> {
        Ok(ArrayD::zeros(IxDyn(&[1, 1, self.classes.unwrap_or(31)])))
    }

    fn output_classes(&self) -> Option<usize> {
        self.classes
    }
}

fn ok_loader(_path: &Path) -> Result<Arc<dyn Recognizer>> {
    Ok(Arc::new(StaticRecognizer { classes: None }))
}

fn model_dir(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("configs.toml"), config).unwrap();
    dir
}

fn sat_config() -> String {
    format!(
        "model_path = \"model.onnx\"\nvocab = \"{}\"\nwidth = 160\nheight = 60\nmax_text_length = 6\n",
        SAT_VOCAB
    )
}

#[test]
fn test_loads_configured_slots() {
    let color = model_dir(&sat_config());
    let gray = model_dir(&sat_config());
    let configs = vec![
        SlotConfig::new("color", color.path()),
        SlotConfig::new("gray", gray.path()),
    ];

    let registry = ModelRegistry::load_all_with(&configs, ok_loader);

    assert!(registry.is_loaded("color"));
    assert!(registry.is_loaded("gray"));
    let slot = registry.get("color").unwrap();
    assert_eq!(slot.vocabulary().as_string(), SAT_VOCAB);
    assert_eq!(slot.input().width, 160);
    assert_eq!(slot.input().height, 60);
    assert_eq!(slot.input().channels, 3);
    assert_eq!(slot.max_text_length(), Some(6));
    assert!(registry.statuses().iter().all(|s| s.loaded && s.error.is_none()));
}

#[test]
fn test_model_path_resolved_against_directory() {
    let dir = model_dir(&sat_config());
    let seen: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

    ModelRegistry::load_all_with(&[SlotConfig::new("color", dir.path())], |path| {
        seen.lock().unwrap().push(path.to_path_buf());
        ok_loader(path)
    });

    assert_eq!(*seen.lock().unwrap(), vec![dir.path().join("model.onnx")]);
}

#[test]
fn test_one_failure_does_not_block_others() {
    let color = model_dir(&sat_config());
    let configs = vec![
        SlotConfig::new("color", color.path()),
        SlotConfig::new("gray", "/nonexistent/model_gris"),
    ];

    let registry = ModelRegistry::load_all_with(&configs, ok_loader);

    assert!(registry.is_loaded("color"));
    assert!(!registry.is_loaded("gray"));
    assert_eq!(registry.statuses().len(), 2);
    assert!(!registry.statuses()[1].loaded);
}

#[test]
fn test_empty_vocabulary_fails_only_its_slot() {
    let color = model_dir(&sat_config());
    let gray = model_dir("model_path = \"model.onnx\"\nvocab = \"\"\nwidth = 160\nheight = 60\n");
    let configs = vec![
        SlotConfig::new("gray", gray.path()),
        SlotConfig::new("color", color.path()),
    ];

    let registry = ModelRegistry::load_all_with(&configs, ok_loader);

    assert!(!registry.is_loaded("gray"));
    assert!(registry.is_loaded("color"));
    let error = registry.statuses()[0].error.clone().unwrap();
    assert!(error.contains("vocab"), "unexpected error: {}", error);
}

#[test]
fn test_bad_toml_is_recorded() {
    let dir = model_dir("this is = = not toml");
    let registry = ModelRegistry::load_all_with(&[SlotConfig::new("color", dir.path())], ok_loader);

    assert!(!registry.any_loaded());
    assert!(registry.statuses()[0]
        .error
        .as_ref()
        .unwrap()
        .contains("Invalid model config"));
}

#[test]
fn test_invalid_channels_rejected() {
    let dir = model_dir(&format!("{}channels = 4\n", sat_config()));
    let registry = ModelRegistry::load_all_with(&[SlotConfig::new("color", dir.path())], ok_loader);
    assert!(!registry.any_loaded());
}

#[test]
fn test_loader_failure_is_recorded() {
    let dir = model_dir(&sat_config());
    let registry = ModelRegistry::load_all_with(&[SlotConfig::new("color", dir.path())], |_| {
        anyhow::bail!("model.onnx not found")
    });

    assert!(!registry.any_loaded());
    assert!(registry.statuses()[0]
        .error
        .as_ref()
        .unwrap()
        .contains("model.onnx not found"));
}

#[test]
fn test_declared_class_count_must_match_vocab() {
    let dir = model_dir(&sat_config());
    let registry = ModelRegistry::load_all_with(&[SlotConfig::new("color", dir.path())], |_| {
        Ok(Arc::new(StaticRecognizer { classes: Some(12) }) as Arc<dyn Recognizer>)
    });
    assert!(!registry.any_loaded());

    let registry = ModelRegistry::load_all_with(&[SlotConfig::new("color", dir.path())], |_| {
        Ok(Arc::new(StaticRecognizer { classes: Some(31) }) as Arc<dyn Recognizer>)
    });
    assert!(registry.is_loaded("color"));
}

#[test]
fn test_duplicate_slot_id_is_rejected() {
    let first = model_dir(&sat_config());
    let second = model_dir(&sat_config());
    let configs = vec![
        SlotConfig::new("color", first.path()),
        SlotConfig::new("color", second.path()),
    ];

    let registry = ModelRegistry::load_all_with(&configs, ok_loader);

    assert_eq!(registry.slots().len(), 1);
    assert_eq!(registry.statuses().len(), 2);
    assert_eq!(
        registry.statuses()[1].error.as_deref(),
        Some("duplicate slot id")
    );
}

#[test]
fn test_onnx_loader_missing_file_is_isolated() {
    let dir = model_dir(&sat_config());
    let registry = ModelRegistry::load_all(&[SlotConfig::new("color", dir.path())]);

    assert!(!registry.any_loaded());
    assert!(!registry.statuses()[0].loaded);
}
