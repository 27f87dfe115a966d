// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Highlight endpoint tests for POST /highlight

use axum::http::StatusCode;
use image::Rgb;

use super::common::*;

const BLUE_BORDER: &str = "파란 테두리";

fn stored_image(dir: &std::path::Path) -> image::RgbImage {
    let entry = std::fs::read_dir(dir.join("processed"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    image::open(entry.path()).unwrap().to_rgb8()
}

fn is_blueish(pixel: &Rgb<u8>) -> bool {
    // JPEG is lossy; blue must dominate clearly
    pixel[2] > 180 && pixel[0] < 90 && pixel[1] < 90
}

#[tokio::test]
async fn test_highlight_draws_blue_border() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general), None);

    let body = multipart_body(
        Some(&png_image()),
        &[("object", "banana"), ("highlightMethod", BLUE_BORDER)],
    );
    let (status, json) = send_json(app, multipart_request("/highlight", body)).await;

    assert_eq!(status, StatusCode::OK);
    let url = json["fileUrl"].as_str().unwrap();
    assert!(url.contains("/static/processed/highlight_"));
    assert!(json.get("detections").is_none());

    // Banana box spans (4,4)-(30,20); left edge midpoint is on the stroke
    let img = stored_image(dir.path());
    assert!(is_blueish(img.get_pixel(4, 12)));
    // Interior and the unmatched apple box stay white
    assert!(!is_blueish(img.get_pixel(17, 12)));
    assert!(!is_blueish(img.get_pixel(40, 25)));
}

#[tokio::test]
async fn test_highlight_unknown_method_keeps_image() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general.clone()), None);

    let body = multipart_body(
        Some(&png_image()),
        &[("object", "banana"), ("highlightMethod", "빨간 테두리")],
    );
    let (status, _) = send_json(app, multipart_request("/highlight", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(general.calls(), 1);
    let img = stored_image(dir.path());
    assert!(!is_blueish(img.get_pixel(4, 12)));
}

#[tokio::test]
async fn test_highlight_missing_method() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general.clone()), None);

    let body = multipart_body(Some(&png_image()), &[("object", "banana")]);
    let (status, json) = send_json(app, multipart_request("/highlight", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing parameters");
    assert_eq!(general.calls(), 0);
    assert_eq!(processed_count(dir.path()), 0);
}

#[tokio::test]
async fn test_highlight_missing_object_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let custom = StubDetector::new("strawberry-yolov5", custom_detections());
    let app = detection_app(dir.path(), Some(general.clone()), Some(custom.clone()));

    let body = multipart_body(Some(&png_image()), &[("highlightMethod", BLUE_BORDER)]);
    let (status, json) = send_json(app, multipart_request("/highlight", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing parameters");
    assert_eq!(json["details"]["field"], "object");
    assert_eq!(general.calls(), 0);
    assert_eq!(custom.calls(), 0);
    assert_eq!(processed_count(dir.path()), 0);
}

#[tokio::test]
async fn test_highlight_strawberry_no_matches_still_saved() {
    let dir = tempfile::tempdir().unwrap();
    let custom = StubDetector::new("strawberry-yolov5", vec![]);
    let app = detection_app(dir.path(), None, Some(custom.clone()));

    let body = multipart_body(
        Some(&png_image()),
        &[("object", "strawberry"), ("highlightMethod", BLUE_BORDER)],
    );
    let (status, json) = send_json(app, multipart_request("/highlight", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["fileUrl"].is_string());
    assert_eq!(custom.calls(), 1);
    assert_eq!(processed_count(dir.path()), 1);
}
