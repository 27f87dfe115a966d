// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection model manager for loading the general and custom YOLO models

use std::sync::Arc;

use serde::Serialize;

use crate::vision::detection::Detector;
use crate::vision::routing::ModelSelector;
use crate::vision::yolo::{coco_labels, load_labels, PostprocessConfig, YoloDetector, YOLO_INPUT_SIZE};

/// Configuration for loading detection models
#[derive(Debug, Clone)]
pub struct DetectionModelConfig {
    /// Path to the pretrained COCO YOLOv5 export (optional)
    pub general_model_path: Option<String>,
    /// Path to the custom-trained YOLOv5 export (optional)
    pub custom_model_path: Option<String>,
    /// Class names of the custom model, one per line (optional)
    pub custom_labels_path: Option<String>,
    /// Confidence threshold for the general model
    pub general_confidence: f32,
    /// Confidence threshold for the custom model
    pub custom_confidence: f32,
    /// IoU threshold for NMS
    pub iou_threshold: f32,
    /// Square model input size
    pub input_size: u32,
}

impl Default for DetectionModelConfig {
    fn default() -> Self {
        Self {
            general_model_path: Some("./models/yolov5s.onnx".to_string()),
            custom_model_path: Some("./models/strawberry.onnx".to_string()),
            custom_labels_path: None,
            general_confidence: 0.25,
            custom_confidence: 0.1,
            iou_threshold: 0.45,
            input_size: YOLO_INPUT_SIZE,
        }
    }
}

/// Information about a detection model slot
#[derive(Debug, Clone, Serialize)]
pub struct DetectionModelInfo {
    /// Model name
    pub name: String,
    /// Slot the model serves
    pub kind: ModelSelector,
    /// Whether the model is loaded
    pub available: bool,
}

/// Manager for the detection models
///
/// Models are loaded once at start-up and shared by every request. A model
/// that fails to load leaves its slot empty; requests routed to it are
/// answered with 503 instead of aborting the process.
#[derive(Clone, Default)]
pub struct DetectionModelManager {
    general: Option<Arc<dyn Detector>>,
    custom: Option<Arc<dyn Detector>>,
}

impl std::fmt::Debug for DetectionModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionModelManager")
            .field("general", &self.general.as_ref().map(|d| d.name().to_string()))
            .field("custom", &self.custom.as_ref().map(|d| d.name().to_string()))
            .finish()
    }
}

impl DetectionModelManager {
    /// Load the configured models; missing files are handled gracefully
    pub async fn new(config: DetectionModelConfig) -> anyhow::Result<Self> {
        let general = match config.general_model_path {
            Some(ref path) => {
                let postprocess = PostprocessConfig {
                    confidence_threshold: config.general_confidence,
                    iou_threshold: config.iou_threshold,
                };
                load_slot("yolov5s", path, Ok(coco_labels()), config.input_size, postprocess)
            }
            None => None,
        };

        let custom = match config.custom_model_path {
            Some(ref path) => {
                let labels = match config.custom_labels_path {
                    Some(ref labels_path) => load_labels(labels_path),
                    None => Ok(vec![crate::vision::routing::STRAWBERRY_LABEL.to_string()]),
                };
                let postprocess = PostprocessConfig {
                    confidence_threshold: config.custom_confidence,
                    iou_threshold: config.iou_threshold,
                };
                load_slot("strawberry-yolov5", path, labels, config.input_size, postprocess)
            }
            None => None,
        };

        Ok(Self { general, custom })
    }

    /// Build a manager from already constructed detectors
    pub fn from_detectors(
        general: Option<Arc<dyn Detector>>,
        custom: Option<Arc<dyn Detector>>,
    ) -> Self {
        Self { general, custom }
    }

    /// Get the detector serving a slot, if loaded
    pub fn get(&self, selector: ModelSelector) -> Option<Arc<dyn Detector>> {
        match selector {
            ModelSelector::General => self.general.clone(),
            ModelSelector::Custom => self.custom.clone(),
        }
    }

    pub fn has(&self, selector: ModelSelector) -> bool {
        self.get(selector).is_some()
    }

    /// List both model slots with availability
    pub fn list_models(&self) -> Vec<DetectionModelInfo> {
        [
            (ModelSelector::General, &self.general, "yolov5s"),
            (ModelSelector::Custom, &self.custom, "strawberry-yolov5"),
        ]
        .into_iter()
        .map(|(kind, slot, default_name)| DetectionModelInfo {
            name: slot
                .as_ref()
                .map(|d| d.name().to_string())
                .unwrap_or_else(|| default_name.to_string()),
            kind,
            available: slot.is_some(),
        })
        .collect()
    }
}

fn load_slot(
    name: &str,
    path: &str,
    labels: anyhow::Result<Vec<String>>,
    input_size: u32,
    postprocess: PostprocessConfig,
) -> Option<Arc<dyn Detector>> {
    let loaded = labels.and_then(|labels| {
        YoloDetector::new(name, path, labels, input_size, postprocess)
    });

    match loaded {
        Ok(model) => {
            tracing::info!("✅ Detection model '{}' loaded from {}", name, path);
            Some(Arc::new(model))
        }
        Err(e) => {
            tracing::warn!("⚠️ Failed to load detection model '{}' from {}: {:#}", name, path, e);
            None
        }
    }
}
