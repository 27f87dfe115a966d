// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Label routing table, detection normalisation and target filtering
//!
//! Which model serves a target label, and how that model's output is
//! relabelled, is declared in [`LabelRoutes`]. Labels without an entry go to
//! the general pretrained model and are passed through untouched.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::detection::Detection;

/// Label served by the custom-trained model
pub const STRAWBERRY_LABEL: &str = "strawberry";

/// Class index written into every strawberry detection.
/// The custom model is single-class, so its own index is 0 as well.
pub const STRAWBERRY_SENTINEL_CLASS: i64 = 0;

/// Which loaded detection model to invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSelector {
    /// Pretrained COCO model
    General,
    /// Custom-trained model
    Custom,
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSelector::General => write!(f, "general"),
            ModelSelector::Custom => write!(f, "custom"),
        }
    }
}

/// Forced class/name values applied after inference
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOverride {
    pub class_id: i64,
    pub name: String,
}

/// Routing entry for one special-cased label
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRoute {
    pub model: ModelSelector,
    pub override_with: Option<DetectionOverride>,
}

static DEFAULT_ROUTE: LabelRoute = LabelRoute {
    model: ModelSelector::General,
    override_with: None,
};

/// Declarative label → {model, override} table
#[derive(Debug, Clone)]
pub struct LabelRoutes {
    routes: HashMap<String, LabelRoute>,
}

impl Default for LabelRoutes {
    fn default() -> Self {
        Self::empty().with_route(
            STRAWBERRY_LABEL,
            LabelRoute {
                model: ModelSelector::Custom,
                override_with: Some(DetectionOverride {
                    class_id: STRAWBERRY_SENTINEL_CLASS,
                    name: STRAWBERRY_LABEL.to_string(),
                }),
            },
        )
    }
}

impl LabelRoutes {
    /// Table where every label resolves to the general model
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Add or replace the route for a label (matched case-insensitively)
    pub fn with_route(mut self, label: &str, route: LabelRoute) -> Self {
        self.routes.insert(normalize_label(label), route);
        self
    }

    /// Resolve the route for a target label; unknown labels use the general model
    pub fn resolve(&self, target: &str) -> &LabelRoute {
        self.routes
            .get(&normalize_label(target))
            .unwrap_or(&DEFAULT_ROUTE)
    }

    /// Model selector for a target label
    pub fn select_model(&self, target: &str) -> ModelSelector {
        self.resolve(target).model
    }

    /// Rewrite class and name of every detection when the target has an override.
    ///
    /// Detections are never added or removed.
    pub fn normalize(&self, target: &str, detections: &mut [Detection]) {
        if let Some(forced) = &self.resolve(target).override_with {
            for det in detections.iter_mut() {
                det.class_id = forced.class_id;
                det.name.clone_from(&forced.name);
            }
        }
    }
}

fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Keep detections whose name contains the target (case-insensitive substring).
///
/// The target is canonicalised the same way the router does it. Input order is
/// preserved; an empty result is valid.
pub fn filter_by_target(detections: Vec<Detection>, target: &str) -> Vec<Detection> {
    let needle = normalize_label(target);
    detections
        .into_iter()
        .filter(|d| d.name.to_lowercase().contains(&needle))
        .collect()
}
