// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Page-type routing: picks the model slot that serves a request
//!
//! Routing is an ordered list of `(marker, slot)` rules checked against the
//! lower-cased `pageType` hint. The first rule whose marker is a substring of
//! the hint names the preferred slot; no match prefers the default slot.
//! An unloaded preference falls back to the default slot, then to the first
//! loaded slot. Only an empty registry fails.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use super::registry::ModelRegistry;
use super::slot::ModelSlot;

/// Slot serving ordinary (color) SAT captchas
pub const DEFAULT_SLOT: &str = "color";

/// Slot serving CFDI verification captchas
pub const GRAY_SLOT: &str = "gray";

/// Hint used when the caller sends no `pageType`
pub const DEFAULT_PAGE_TYPE: &str = "color";

/// Routing failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("no model slot is loaded")]
    NoModelAvailable,
}

/// One routing rule: hints containing `marker` prefer `slot`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub marker: String,
    pub slot: String,
}

impl RouteRule {
    pub fn new(marker: impl Into<String>, slot: impl Into<String>) -> Self {
        Self {
            marker: marker.into().trim().to_lowercase(),
            slot: slot.into().trim().to_string(),
        }
    }
}

impl FromStr for RouteRule {
    type Err = String;

    /// Parse `MARKER=SLOT`, e.g. `cfdi=gray`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (marker, slot) = s
            .split_once('=')
            .ok_or_else(|| format!("expected MARKER=SLOT, got '{}'", s))?;
        let rule = Self::new(marker, slot);
        if rule.marker.is_empty() || rule.slot.is_empty() {
            return Err(format!("expected MARKER=SLOT, got '{}'", s));
        }
        Ok(rule)
    }
}

impl fmt::Display for RouteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.marker, self.slot)
    }
}

/// Result of routing one request
#[derive(Debug, Clone)]
pub struct Selection {
    pub slot: Arc<ModelSlot>,
    /// Slot the rules asked for
    pub preferred: String,
    /// True when `slot` is not the preferred slot
    pub fell_back: bool,
}

/// Ordered routing rules with a single default slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPolicy {
    rules: Vec<RouteRule>,
    default_slot: String,
}

impl Default for RoutingPolicy {
    /// `gris`, `gray` and `cfdi` go to the gray model; everything else to color
    fn default() -> Self {
        Self::new(
            vec![
                RouteRule::new("gris", GRAY_SLOT),
                RouteRule::new("gray", GRAY_SLOT),
                RouteRule::new("cfdi", GRAY_SLOT),
            ],
            DEFAULT_SLOT,
        )
    }
}

impl RoutingPolicy {
    pub fn new(rules: Vec<RouteRule>, default_slot: impl Into<String>) -> Self {
        Self {
            rules,
            default_slot: default_slot.into(),
        }
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn default_slot(&self) -> &str {
        &self.default_slot
    }

    /// Lower-case and trim a hint; absent or blank hints become the default page type
    pub fn normalize_hint(hint: Option<&str>) -> String {
        match hint.map(str::trim) {
            Some(h) if !h.is_empty() => h.to_lowercase(),
            _ => DEFAULT_PAGE_TYPE.to_string(),
        }
    }

    /// Slot the rules prefer for `hint`, ignoring what is loaded
    pub fn preferred_slot(&self, hint: Option<&str>) -> &str {
        let hint = Self::normalize_hint(hint);
        self.rules
            .iter()
            .find(|rule| hint.contains(rule.marker.as_str()))
            .map(|rule| rule.slot.as_str())
            .unwrap_or(self.default_slot.as_str())
    }

    /// Pick the slot that serves `hint`
    ///
    /// # Errors
    /// [`RouteError::NoModelAvailable`] when the registry has no loaded slot.
    pub fn select(
        &self,
        hint: Option<&str>,
        registry: &ModelRegistry,
    ) -> Result<Selection, RouteError> {
        let preferred = self.preferred_slot(hint).to_string();

        if let Some(slot) = registry.get(&preferred) {
            return Ok(Selection {
                slot,
                preferred,
                fell_back: false,
            });
        }

        let slot = registry
            .get(&self.default_slot)
            .or_else(|| registry.first_loaded())
            .ok_or(RouteError::NoModelAvailable)?;

        Ok(Selection {
            slot,
            preferred,
            fell_back: true,
        })
    }
}
