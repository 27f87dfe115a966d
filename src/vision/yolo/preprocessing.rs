// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLOv5 detectors

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input size of exported YOLOv5 models
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Grey used by YOLOv5 for letterbox padding
pub const LETTERBOX_FILL: u8 = 114;

/// Scale and padding applied during letterboxing
///
/// Needed to map predicted boxes back to original image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxInfo {
    /// Scale factor applied to the original image
    pub scale: f32,
    /// Horizontal padding on the left edge
    pub pad_x: f32,
    /// Vertical padding on the top edge
    pub pad_y: f32,
    /// Original image width
    pub original_width: u32,
    /// Original image height
    pub original_height: u32,
}

impl LetterboxInfo {
    /// Calculate letterbox parameters for an image
    pub fn new(original_width: u32, original_height: u32, target_size: u32) -> Self {
        if original_width == 0 || original_height == 0 {
            return Self {
                scale: 1.0,
                pad_x: 0.0,
                pad_y: 0.0,
                original_width,
                original_height,
            };
        }

        let scale = (target_size as f32 / original_width as f32)
            .min(target_size as f32 / original_height as f32);
        let new_w = ((original_width as f32 * scale).round() as u32).max(1);
        let new_h = ((original_height as f32 * scale).round() as u32).max(1);

        Self {
            scale,
            pad_x: ((target_size - new_w.min(target_size)) / 2) as f32,
            pad_y: ((target_size - new_h.min(target_size)) / 2) as f32,
            original_width,
            original_height,
        }
    }

    /// Map a point from model input space back to the original image, clamped to its bounds
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.pad_x) / self.scale;
        let orig_y = (y - self.pad_y) / self.scale;
        (
            orig_x.clamp(0.0, self.original_width as f32),
            orig_y.clamp(0.0, self.original_height as f32),
        )
    }
}

/// Resize with preserved aspect ratio and pad to a square canvas
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, LetterboxInfo) {
    let (orig_w, orig_h) = image.dimensions();
    let info = LetterboxInfo::new(orig_w, orig_h, target_size);

    let mut canvas = RgbImage::from_pixel(
        target_size,
        target_size,
        Rgb([LETTERBOX_FILL, LETTERBOX_FILL, LETTERBOX_FILL]),
    );

    if orig_w == 0 || orig_h == 0 {
        return (canvas, info);
    }

    let new_w = ((orig_w as f32 * info.scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * info.scale).round() as u32).clamp(1, target_size);
    let resized = image
        .resize_exact(new_w, new_h, FilterType::Triangle)
        .to_rgb8();

    image::imageops::replace(
        &mut canvas,
        &resized,
        info.pad_x as i64,
        info.pad_y as i64,
    );

    (canvas, info)
}

/// Preprocess an image into a normalised NCHW tensor `[1, 3, S, S]` with values in 0..1
pub fn preprocess_for_yolo(image: &DynamicImage, target_size: u32) -> (Array4<f32>, LetterboxInfo) {
    let (canvas, info) = letterbox(image, target_size);
    let size = target_size as usize;

    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, info)
}
