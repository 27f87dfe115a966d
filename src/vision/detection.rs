// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection types shared by the detectors, the pipeline and the API

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in original image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BoundingBox {
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> f32 {
        (self.xmax - self.xmin).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.ymax - self.ymin).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.xmin.max(other.xmin);
        let y1 = self.ymin.max(other.ymin);
        let x2 = self.xmax.min(other.xmax);
        let y2 = self.ymax.min(other.ymax);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Corner coordinates truncated toward zero, as used for drawing
    pub fn to_pixel_corners(&self) -> (i32, i32, i32, i32) {
        (
            self.xmin as i32,
            self.ymin as i32,
            self.xmax as i32,
            self.ymax as i32,
        )
    }
}

/// One model-predicted object instance
///
/// Serializes as a flat record: `{xmin, ymin, xmax, ymax, confidence, class, name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(flatten)]
    pub bounding_box: BoundingBox,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Class index in the producing model's taxonomy
    #[serde(rename = "class")]
    pub class_id: i64,
    /// Class name
    pub name: String,
}

impl Detection {
    pub fn new(
        class_id: i64,
        name: impl Into<String>,
        confidence: f32,
        bounding_box: BoundingBox,
    ) -> Self {
        Self {
            bounding_box,
            confidence,
            class_id,
            name: name.into(),
        }
    }
}

/// Black-box object detector
///
/// Implementations must be safe to call from several request tasks at once;
/// the ONNX-backed detectors serialise access to their session internally.
pub trait Detector: Send + Sync {
    /// Short model name reported by the health endpoint
    fn name(&self) -> &str;

    /// Run inference on a decoded image
    fn infer(&self, image: &DynamicImage) -> anyhow::Result<Vec<Detection>>;
}
