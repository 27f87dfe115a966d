// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Highlight renderer behaviour on real image buffers

use image::{DynamicImage, Rgb, RgbImage};
use lookback_ai::vision::{
    highlight::{BLUE_BORDER_COLOR, BLUE_BORDER_STROKE},
    render_highlights, BoundingBox, Detection, HighlightMethod, BLUE_BORDER_SELECTOR,
};

fn canvas() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(80, 60, Rgb([255, 255, 255])))
}

fn det(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Detection {
    Detection::new(46, "banana", 0.8, BoundingBox::new(xmin, ymin, xmax, ymax))
}

#[test]
fn test_style_constants() {
    assert_eq!(BLUE_BORDER_SELECTOR, "파란 테두리");
    assert_eq!(BLUE_BORDER_COLOR, Rgb([0, 0, 255]));
    assert_eq!(BLUE_BORDER_STROKE, 4);
}

#[test]
fn test_every_detection_gets_a_border() {
    let mut img = canvas();
    let drawn = render_highlights(
        &mut img,
        &[det(5.0, 5.0, 25.0, 25.0), det(40.0, 20.0, 70.0, 50.0)],
        &HighlightMethod::parse(BLUE_BORDER_SELECTOR),
    );
    assert_eq!(drawn, 2);

    let rgb = img.to_rgb8();
    assert_eq!(*rgb.get_pixel(5, 15), BLUE_BORDER_COLOR);
    assert_eq!(*rgb.get_pixel(70, 35), BLUE_BORDER_COLOR);
    assert_eq!(*rgb.get_pixel(55, 20), BLUE_BORDER_COLOR);
    assert_eq!(*rgb.get_pixel(55, 35), Rgb([255, 255, 255]));
}

#[test]
fn test_fractional_coordinates_truncate() {
    let mut img = canvas();
    render_highlights(&mut img, &[det(10.9, 10.9, 30.9, 30.9)], &HighlightMethod::BlueBorder);

    let rgb = img.to_rgb8();
    // Top edge sits on y = 10, stroke covers 8..=11
    assert_eq!(*rgb.get_pixel(20, 8), BLUE_BORDER_COLOR);
    assert_eq!(*rgb.get_pixel(20, 11), BLUE_BORDER_COLOR);
    assert_eq!(*rgb.get_pixel(20, 12), Rgb([255, 255, 255]));
    assert_eq!(*rgb.get_pixel(20, 7), Rgb([255, 255, 255]));
}

#[test]
fn test_other_selectors_never_draw() {
    for selector in ["빨간 테두리", "blue border", "파란테두리", ""] {
        let mut img = canvas();
        let before = img.to_rgb8();
        let drawn = render_highlights(
            &mut img,
            &[det(5.0, 5.0, 25.0, 25.0)],
            &HighlightMethod::parse(selector),
        );
        assert_eq!(drawn, 0, "selector {:?} drew", selector);
        assert_eq!(img.to_rgb8(), before);
    }
}
