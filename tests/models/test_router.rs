// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Page-type routing against populated registries

use ndarray::{Array4, ArrayD, IxDyn};
use sat_captcha_solver::models::{
    InputDimensions, ModelRegistry, ModelSlot, Recognizer, RouteError, RouteRule, RoutingPolicy,
    Vocabulary,
};
use std::sync::Arc;

struct NullRecognizer;

impl Recognizer for NullRecognizer {
    fn recognize(&self, _input: Array4<f32>) -> anyhow::Result<ArrayD<f32>> {
        Ok(ArrayD::zeros(IxDyn(&[1, 1, 4])))
    }
}

fn registry(ids: &[&str]) -> ModelRegistry {
    ModelRegistry::from_slots(
        ids.iter()
            .map(|id| {
                ModelSlot::new(
                    *id,
                    Vocabulary::new("ABC").unwrap(),
                    InputDimensions::new(160, 60, 3).unwrap(),
                    Arc::new(NullRecognizer),
                )
            })
            .collect(),
    )
}

#[test]
fn test_gray_hints_select_gray() {
    let policy = RoutingPolicy::default();
    let registry = registry(&["color", "gray"]);

    for hint in ["gris", "GRIS", " gray ", "cfdi", "verificacfdi", "pagina-gris"] {
        let selection = policy.select(Some(hint), &registry).unwrap();
        assert_eq!(selection.slot.id(), "gray", "hint '{}'", hint);
        assert!(!selection.fell_back);
    }
}

#[test]
fn test_other_hints_select_color() {
    let policy = RoutingPolicy::default();
    let registry = registry(&["color", "gray"]);

    for hint in [None, Some(""), Some("color"), Some("COLOR"), Some("unknown")] {
        let selection = policy.select(hint, &registry).unwrap();
        assert_eq!(selection.slot.id(), "color", "hint {:?}", hint);
        assert!(!selection.fell_back);
    }
}

#[test]
fn test_gray_falls_back_to_color() {
    let policy = RoutingPolicy::default();
    let selection = policy.select(Some("gris"), &registry(&["color"])).unwrap();

    assert_eq!(selection.preferred, "gray");
    assert_eq!(selection.slot.id(), "color");
    assert!(selection.fell_back);
}

#[test]
fn test_falls_back_to_first_loaded_slot() {
    let policy = RoutingPolicy::default();
    let selection = policy.select(Some("color"), &registry(&["gray"])).unwrap();

    assert_eq!(selection.preferred, "color");
    assert_eq!(selection.slot.id(), "gray");
    assert!(selection.fell_back);
}

#[test]
fn test_unknown_slot_in_rule_falls_back() {
    let policy = RoutingPolicy::new(vec![RouteRule::new("cfdi", "cfdi")], "color");
    let selection = policy.select(Some("cfdi"), &registry(&["color", "gray"])).unwrap();
    assert_eq!(selection.slot.id(), "color");
    assert!(selection.fell_back);
}

#[test]
fn test_nothing_loaded_is_the_only_failure() {
    let policy = RoutingPolicy::default();
    for hint in [None, Some("gris"), Some("color")] {
        assert_eq!(
            policy.select(hint, &registry(&[])).unwrap_err(),
            RouteError::NoModelAvailable
        );
    }
}
