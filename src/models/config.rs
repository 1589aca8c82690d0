// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-model configuration: which directory backs each slot, and the
//! `configs.toml` written next to the exported ONNX weights

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the configuration file inside each model directory
pub const MODEL_CONFIG_FILE: &str = "configs.toml";

fn default_channels() -> u32 {
    3
}

/// Where to load one slot from
///
/// Parsed from `ID=DIR`, e.g. `color=./model` or `gray=./model_gris`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConfig {
    pub id: String,
    pub dir: PathBuf,
}

impl SlotConfig {
    pub fn new(id: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            dir: dir.into(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(MODEL_CONFIG_FILE)
    }
}

impl FromStr for SlotConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, dir) = s
            .split_once('=')
            .ok_or_else(|| format!("expected ID=DIR, got '{}'", s))?;
        let id = id.trim();
        let dir = dir.trim();
        if id.is_empty() || dir.is_empty() {
            return Err(format!("expected ID=DIR, got '{}'", s));
        }
        Ok(Self::new(id, dir))
    }
}

impl fmt::Display for SlotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.id, self.dir.display())
    }
}

/// Contents of `configs.toml`
///
/// ```toml
/// model_path = "model.onnx"
/// vocab = "Y65WRD98SMBG3NJ21CP4KF7ZXHVTQL"
/// height = 60
/// width = 160
/// max_text_length = 6
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModelFileConfig {
    /// Weight artifact, relative to the model directory unless absolute
    pub model_path: PathBuf,
    pub vocab: String,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_channels")]
    pub channels: u32,
    #[serde(default)]
    pub max_text_length: Option<usize>,
}

impl ModelFileConfig {
    /// Read `<dir>/configs.toml`
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MODEL_CONFIG_FILE);
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read model config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid model config {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Weight artifact path resolved against the model directory
    pub fn resolve_model_path(&self, dir: &Path) -> PathBuf {
        if self.model_path.is_absolute() {
            self.model_path.clone()
        } else {
            dir.join(&self.model_path)
        }
    }
}
