// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv5 output decoding and non-maximum suppression

use anyhow::Result;
use ndarray::{ArrayViewD, Axis, Ix2};

use super::labels::label_for;
use super::preprocessing::LetterboxInfo;
use crate::vision::detection::{BoundingBox, Detection};

/// Upper bound on detections kept per image (YOLOv5 `max_det`)
pub const MAX_DETECTIONS: usize = 1000;

/// Thresholds for decoding raw predictions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostprocessConfig {
    /// Minimum `objectness * class score`
    pub confidence_threshold: f32,
    /// IoU above which a same-class box is suppressed
    pub iou_threshold: f32,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
        }
    }
}

/// Decode a YOLOv5 prediction tensor of shape `[1, N, 5 + classes]`
///
/// Each row is `cx, cy, w, h, objectness, class scores...` in model input
/// space. Boxes are mapped back to the original image through `letterbox`.
pub fn decode_predictions(
    output: ArrayViewD<f32>,
    letterbox: &LetterboxInfo,
    labels: &[String],
    config: &PostprocessConfig,
) -> Result<Vec<Detection>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 || shape[2] < 6 {
        anyhow::bail!(
            "Unexpected YOLO output shape: {:?}, expected [1, N, 5 + classes]",
            shape
        );
    }

    let rows = output
        .index_axis(Axis(0), 0)
        .into_dimensionality::<Ix2>()?;

    let mut candidates = Vec::new();
    for row in rows.outer_iter() {
        let objectness = row[4];
        if !objectness.is_finite() || objectness < config.confidence_threshold {
            continue;
        }

        let (class_id, class_score) = row
            .iter()
            .skip(5)
            .enumerate()
            .fold((0usize, f32::NEG_INFINITY), |(best_idx, best), (idx, &score)| {
                if score > best {
                    (idx, score)
                } else {
                    (best_idx, best)
                }
            });

        let confidence = objectness * class_score;
        if !confidence.is_finite() || confidence < config.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        if w <= 0.0 || h <= 0.0 {
            continue;
        }

        let (xmin, ymin) = letterbox.map_to_original(cx - w / 2.0, cy - h / 2.0);
        let (xmax, ymax) = letterbox.map_to_original(cx + w / 2.0, cy + h / 2.0);
        if xmax - xmin < 1e-3 || ymax - ymin < 1e-3 {
            continue;
        }

        candidates.push(Detection::new(
            class_id as i64,
            label_for(labels, class_id),
            confidence,
            BoundingBox::new(xmin, ymin, xmax, ymax),
        ));
    }

    Ok(non_max_suppression(candidates, config.iou_threshold))
}

/// Class-aware NMS; result is sorted by descending confidence
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<Detection> = Vec::new();
    for candidate in detections {
        let suppressed = keep.iter().any(|kept| {
            kept.class_id == candidate.class_id
                && kept.bounding_box.iou(&candidate.bounding_box) > iou_threshold
        });
        if !suppressed {
            keep.push(candidate);
            if keep.len() >= MAX_DETECTIONS {
                break;
            }
        }
    }

    keep
}
