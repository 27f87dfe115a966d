// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection on CPU
//!
//! This module provides:
//! - YOLOv5 inference via ONNX Runtime (general COCO and custom strawberry models)
//! - Label routing, normalisation and target filtering
//! - Blue-border highlight rendering
//!
//! Models are loaded once and shared across requests.

pub mod detection;
pub mod highlight;
pub mod image_utils;
pub mod model_manager;
pub mod pipeline;
pub mod routing;
pub mod yolo;

pub use detection::{BoundingBox, Detection, Detector};
pub use highlight::{render_highlights, HighlightMethod, BLUE_BORDER_SELECTOR};
pub use image_utils::{decode_image_bytes, detect_format, encode_jpeg, ImageError, ImageInfo};
pub use model_manager::{DetectionModelConfig, DetectionModelInfo, DetectionModelManager};
pub use pipeline::{DetectOutcome, DetectionError, DetectionPipeline, HighlightOutcome};
pub use routing::{filter_by_target, LabelRoute, LabelRoutes, ModelSelector, STRAWBERRY_LABEL};
