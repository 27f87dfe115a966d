// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv5 object detection on CPU
//!
//! Components:
//! - `preprocessing` - Letterbox resize into an NCHW tensor
//! - `postprocess` - Prediction decoding and NMS
//! - `labels` - Class name tables
//! - `model` - ONNX session wrapper implementing `Detector`

pub mod labels;
pub mod model;
pub mod postprocess;
pub mod preprocessing;

pub use labels::{coco_labels, load_labels, COCO_LABELS};
pub use model::YoloDetector;
pub use postprocess::{decode_predictions, non_max_suppression, PostprocessConfig};
pub use preprocessing::{preprocess_for_yolo, LetterboxInfo, YOLO_INPUT_SIZE};
