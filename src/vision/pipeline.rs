// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detect and highlight pipelines
//!
//! Decode → route → infer → normalize → filter → [render] → persist. Every
//! stage returns its own error; nothing is written unless all earlier stages
//! succeeded. The whole pipeline is synchronous and runs on a blocking thread.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

use super::detection::Detection;
use super::highlight::{render_highlights, HighlightMethod};
use super::image_utils::{decode_image_bytes, ImageError, MAX_IMAGE_SIZE};
use super::model_manager::DetectionModelManager;
use super::routing::{filter_by_target, LabelRoutes, ModelSelector};
use crate::storage::{ArtifactError, ArtifactStore, PersistedArtifact};

/// Artifact prefix for `/detect`
pub const DETECT_PREFIX: &str = "detect";

/// Artifact prefix for `/highlight`
pub const HIGHLIGHT_PREFIX: &str = "highlight";

/// Errors raised by the detection pipeline
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Invalid image: {0}")]
    Decode(#[from] ImageError),

    #[error("Detection model '{0}' is not loaded")]
    ModelUnavailable(ModelSelector),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Failed to persist result: {0}")]
    Persist(#[from] ArtifactError),
}

/// Output of `/detect`
#[derive(Debug, Clone)]
pub struct DetectOutcome {
    pub artifact: PersistedArtifact,
    pub detections: Vec<Detection>,
    pub model: ModelSelector,
}

/// Output of `/highlight`
#[derive(Debug, Clone)]
pub struct HighlightOutcome {
    pub artifact: PersistedArtifact,
    pub boxes_drawn: usize,
    pub model: ModelSelector,
}

/// Shared detection pipeline
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    models: DetectionModelManager,
    routes: LabelRoutes,
    artifacts: ArtifactStore,
    max_image_bytes: usize,
}

impl DetectionPipeline {
    pub fn new(models: DetectionModelManager, routes: LabelRoutes, artifacts: ArtifactStore) -> Self {
        Self {
            models,
            routes,
            artifacts,
            max_image_bytes: MAX_IMAGE_SIZE,
        }
    }

    /// Largest accepted encoded image; should match the upload body limit
    pub fn with_max_image_bytes(mut self, max_bytes: usize) -> Self {
        self.max_image_bytes = max_bytes;
        self
    }

    pub fn models(&self) -> &DetectionModelManager {
        &self.models
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Route, infer, normalize and filter for a decoded image
    pub fn detect_objects(
        &self,
        image: &image::DynamicImage,
        target: &str,
    ) -> Result<(ModelSelector, Vec<Detection>), DetectionError> {
        let selector = self.routes.select_model(target);
        let detector = self
            .models
            .get(selector)
            .ok_or(DetectionError::ModelUnavailable(selector))?;

        let start = Instant::now();
        let mut detections = detector
            .infer(image)
            .map_err(|e| DetectionError::Inference(format!("{:#}", e)))?;
        let raw_count = detections.len();

        self.routes.normalize(target, &mut detections);
        let detections = filter_by_target(detections, target);

        debug!(
            "Model {} ({}) returned {} detections, {} match '{}' ({}ms)",
            selector,
            detector.name(),
            raw_count,
            detections.len(),
            target,
            start.elapsed().as_millis()
        );

        Ok((selector, detections))
    }

    /// `/detect`: persist the unannotated image with the matching detections
    pub fn detect(&self, image_bytes: &[u8], target: &str) -> Result<DetectOutcome, DetectionError> {
        let (image, image_info) = decode_image_bytes(image_bytes, self.max_image_bytes)?;
        debug!(
            "Decoded {}x{} image ({} bytes)",
            image_info.width, image_info.height, image_info.size_bytes
        );

        let (model, detections) = self.detect_objects(&image, target)?;
        let artifact = self.artifacts.persist(&image, DETECT_PREFIX)?;

        info!(
            "Detected {} '{}' object(s), saved {}",
            detections.len(),
            target,
            artifact.file_path.display()
        );

        Ok(DetectOutcome {
            artifact,
            detections,
            model,
        })
    }

    /// `/highlight`: draw the requested style around matches and persist
    pub fn highlight(
        &self,
        image_bytes: &[u8],
        target: &str,
        method: &HighlightMethod,
    ) -> Result<HighlightOutcome, DetectionError> {
        let (mut image, _) = decode_image_bytes(image_bytes, self.max_image_bytes)?;

        let (model, detections) = self.detect_objects(&image, target)?;
        let boxes_drawn = render_highlights(&mut image, &detections, method);
        if !method.draws() {
            debug!("Highlight method {:?} not recognised, image left as-is", method);
        }

        let artifact = self.artifacts.persist(&image, HIGHLIGHT_PREFIX)?;

        info!(
            "Highlighted {} '{}' object(s), saved {}",
            boxes_drawn,
            target,
            artifact.file_path.display()
        );

        Ok(HighlightOutcome {
            artifact,
            boxes_drawn,
            model,
        })
    }
}
