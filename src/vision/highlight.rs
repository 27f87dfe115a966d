// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Highlight rendering for matched detections

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use super::detection::Detection;

/// Selector value for the blue border style ("blue border")
pub const BLUE_BORDER_SELECTOR: &str = "파란 테두리";

/// Blue border colour (RGB)
pub const BLUE_BORDER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Blue border stroke width in pixels
pub const BLUE_BORDER_STROKE: u32 = 4;

/// Rendering style chosen by the `highlightMethod` form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightMethod {
    /// Fixed-colour rectangle around every detection
    BlueBorder,
    /// Any unrecognised selector; rendering is skipped
    Unrecognized(String),
}

impl HighlightMethod {
    /// Parse a selector string; unknown selectors are not an error
    pub fn parse(selector: &str) -> Self {
        if selector == BLUE_BORDER_SELECTOR {
            HighlightMethod::BlueBorder
        } else {
            HighlightMethod::Unrecognized(selector.to_string())
        }
    }

    pub fn draws(&self) -> bool {
        matches!(self, HighlightMethod::BlueBorder)
    }
}

/// Draw the chosen style onto `image` for each detection.
///
/// Returns the number of boxes drawn.
pub fn render_highlights(
    image: &mut DynamicImage,
    detections: &[Detection],
    method: &HighlightMethod,
) -> usize {
    if !method.draws() || detections.is_empty() {
        return 0;
    }

    let mut canvas = image.to_rgb8();
    let mut drawn = 0;
    for det in detections {
        let (x1, y1, x2, y2) = det.bounding_box.to_pixel_corners();
        if draw_box(&mut canvas, (x1, y1, x2, y2), BLUE_BORDER_COLOR, BLUE_BORDER_STROKE) {
            drawn += 1;
        }
    }

    *image = DynamicImage::ImageRgb8(canvas);
    drawn
}

/// Draw a rectangle with the stroke centred on the box edge.
///
/// Pixels outside the canvas are clipped. Returns false for inverted boxes.
fn draw_box(
    canvas: &mut RgbImage,
    (x1, y1, x2, y2): (i32, i32, i32, i32),
    color: Rgb<u8>,
    stroke: u32,
) -> bool {
    if x2 < x1 || y2 < y1 {
        return false;
    }

    let half = (stroke / 2) as i32;
    for i in 0..stroke as i32 {
        // Offset from the nominal edge; negative grows outward
        let offset = i - half;
        let width = x2 - x1 + 1 - 2 * offset;
        let height = y2 - y1 + 1 - 2 * offset;
        if width <= 0 || height <= 0 {
            continue;
        }

        let rect = Rect::at(x1 + offset, y1 + offset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }

    true
}
