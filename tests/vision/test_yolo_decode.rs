// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! YOLOv5 output decoding against hand-built prediction tensors

use image::DynamicImage;
use lookback_ai::vision::yolo::{
    coco_labels, decode_predictions, preprocess_for_yolo, LetterboxInfo, PostprocessConfig,
    YOLO_INPUT_SIZE,
};
use ndarray::{ArrayD, IxDyn};

/// One prediction row: cx, cy, w, h, objectness, class scores...
#[allow(clippy::too_many_arguments)]
fn row(cx: f32, cy: f32, w: f32, h: f32, obj: f32, class: usize, score: f32, classes: usize) -> Vec<f32> {
    let mut r = vec![cx, cy, w, h, obj];
    let mut scores = vec![0.0; classes];
    scores[class] = score;
    r.extend(scores);
    r
}

fn tensor(rows: Vec<Vec<f32>>) -> ArrayD<f32> {
    let n = rows.len();
    let width = rows[0].len();
    let flat: Vec<f32> = rows.into_iter().flatten().collect();
    ArrayD::from_shape_vec(IxDyn(&[1, n, width]), flat).unwrap()
}

#[test]
fn test_preprocess_shape() {
    let img = DynamicImage::new_rgb8(320, 240);
    let (input, letterbox) = preprocess_for_yolo(&img, YOLO_INPUT_SIZE);
    assert_eq!(input.shape(), &[1, 3, 640, 640]);
    assert_eq!(letterbox.scale, 2.0);
}

#[test]
fn test_decode_maps_back_to_original_pixels() {
    let labels = coco_labels();
    let classes = labels.len();
    // 320x240 image letterboxed into 640x640: scale 2, pad_y 80
    let letterbox = LetterboxInfo::new(320, 240, 640);

    let output = tensor(vec![
        // banana centred at (100, 100) original → (200, 280) letterboxed, 40x20 original
        row(200.0, 280.0, 80.0, 40.0, 0.9, 46, 0.9, classes),
        // below threshold
        row(300.0, 300.0, 50.0, 50.0, 0.3, 47, 0.3, classes),
    ]);

    let detections = decode_predictions(
        output.view(),
        &letterbox,
        &labels,
        &PostprocessConfig::default(),
    )
    .unwrap();

    assert_eq!(detections.len(), 1);
    let d = &detections[0];
    assert_eq!(d.name, "banana");
    assert_eq!(d.class_id, 46);
    assert!((d.confidence - 0.81).abs() < 1e-5);
    assert!((d.bounding_box.xmin - 80.0).abs() < 1e-3);
    assert!((d.bounding_box.xmax - 120.0).abs() < 1e-3);
    assert!((d.bounding_box.ymin - 90.0).abs() < 1e-3);
    assert!((d.bounding_box.ymax - 110.0).abs() < 1e-3);
}

#[test]
fn test_custom_threshold_keeps_weak_strawberries() {
    let labels = vec!["strawberry".to_string()];
    let letterbox = LetterboxInfo::new(640, 640, 640);
    let output = tensor(vec![row(100.0, 100.0, 20.0, 20.0, 0.4, 0, 0.4, 1)]);

    let general = PostprocessConfig::default();
    let custom = PostprocessConfig {
        confidence_threshold: 0.1,
        ..Default::default()
    };

    assert!(decode_predictions(output.view(), &letterbox, &labels, &general)
        .unwrap()
        .is_empty());
    assert_eq!(
        decode_predictions(output.view(), &letterbox, &labels, &custom)
            .unwrap()
            .len(),
        1
    );
}
