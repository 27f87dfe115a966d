// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime wrapper for YOLOv5 detection models
//!
//! Both the pretrained COCO model and the custom strawberry model are YOLOv5
//! exports and share this wrapper; they differ only in label table and
//! confidence threshold.

use anyhow::{Context, Result};
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::postprocess::{decode_predictions, PostprocessConfig};
use super::preprocessing::preprocess_for_yolo;
use crate::vision::detection::{Detection, Detector};

/// YOLOv5 detector backed by an ONNX session
#[derive(Clone)]
pub struct YoloDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model name reported by the health endpoint
    model_name: String,
    /// Model input name
    input_name: String,
    /// Class names indexed by class id
    labels: Arc<Vec<String>>,
    /// Square input size
    input_size: u32,
    /// Decoding thresholds
    postprocess: PostprocessConfig,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("model_name", &self.model_name)
            .field("input_name", &self.input_name)
            .field("labels", &self.labels.len())
            .field("input_size", &self.input_size)
            .field("postprocess", &self.postprocess)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load a YOLOv5 ONNX export
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        labels: Vec<String>,
        input_size: u32,
        postprocess: PostprocessConfig,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("YOLO model not found: {}", model_path.display());
        }
        if labels.is_empty() {
            anyhow::bail!("YOLO model {} has an empty label table", model_name);
        }

        info!("Loading YOLO model '{}' from {}", model_name, model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load YOLO model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        debug!(
            "YOLO model '{}' input: {}, {} classes",
            model_name,
            input_name,
            labels.len()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            model_name,
            input_name,
            labels: Arc::new(labels),
            input_size,
            postprocess,
        })
    }
}

impl Detector for YoloDetector {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn infer(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let start = Instant::now();
        let (input, letterbox) = preprocess_for_yolo(image, self.input_size);

        let input_value =
            Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("YOLO session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("YOLO inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let detections =
            decode_predictions(output_tensor.view(), &letterbox, &self.labels, &self.postprocess)?;

        debug!(
            "YOLO '{}' produced {} detections in {}ms",
            self.model_name,
            detections.len(),
            start.elapsed().as_millis()
        );

        Ok(detections)
    }
}
