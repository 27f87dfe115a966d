// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detect endpoint tests for POST /detect
//!
//! Drives the real router with multipart bodies and stub detectors.

use axum::http::StatusCode;
use lookback_ai::vision::Detector;
use std::sync::Arc;

use super::common::*;

#[tokio::test]
async fn test_detect_returns_matching_detections() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general.clone()), None);

    let body = multipart_body(Some(&png_image()), &[("object", "banana")]);
    let (status, json) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::OK);
    let detections = json["detections"].as_array().unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0]["name"], "banana");
    assert_eq!(detections[0]["class"], 46);
    assert_eq!(detections[0]["xmin"], 4.0);
    assert_eq!(general.calls(), 1);

    let url = json["fileUrl"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:5000/static/processed/detect_"));
    assert!(url.ends_with(".jpg"));
    assert_eq!(processed_count(dir.path()), 1);
}

#[tokio::test]
async fn test_detect_target_is_case_insensitive_substring() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general), None);

    // "APP" is a substring of "apple"
    let body = multipart_body(Some(&png_image()), &[("object", "APP")]);
    let (status, json) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::OK);
    let detections = json["detections"].as_array().unwrap();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0]["name"], "apple");
}

#[tokio::test]
async fn test_detect_strawberry_uses_custom_model() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let custom = StubDetector::new("strawberry-yolov5", custom_detections());
    let app = detection_app(dir.path(), Some(general.clone()), Some(custom.clone()));

    let body = multipart_body(Some(&png_image()), &[("object", "Strawberry")]);
    let (status, json) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(custom.calls(), 1);
    assert_eq!(general.calls(), 0);

    let detections = json["detections"].as_array().unwrap();
    assert_eq!(detections.len(), 2);
    for det in detections {
        assert_eq!(det["class"], 0);
        assert_eq!(det["name"], "strawberry");
    }
}

#[tokio::test]
async fn test_detect_no_matches_is_ok_with_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general), None);

    let body = multipart_body(Some(&png_image()), &[("object", "giraffe")]);
    let (status, json) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["detections"].as_array().unwrap().is_empty());
    assert!(json["fileUrl"].is_string());
}

#[tokio::test]
async fn test_detect_missing_object_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general.clone()), None);

    let body = multipart_body(Some(&png_image()), &[]);
    let (status, json) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing object parameter");
    assert_eq!(json["errorType"], "validation_error");
    assert_eq!(general.calls(), 0);
    assert_eq!(processed_count(dir.path()), 0);
}

#[tokio::test]
async fn test_detect_missing_image() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general.clone()), None);

    let body = multipart_body(None, &[("object", "banana")]);
    let (status, json) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing image file");
    assert_eq!(general.calls(), 0);
}

#[tokio::test]
async fn test_detect_undecodable_image_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general.clone()), None);

    let body = multipart_body(Some(b"not really a picture"), &[("object", "banana")]);
    let (status, json) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Invalid image"));
    assert_eq!(general.calls(), 0);
    assert_eq!(processed_count(dir.path()), 0);
}

#[tokio::test]
async fn test_detect_unloaded_model_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let general: Arc<dyn Detector> = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general), None);

    let body = multipart_body(Some(&png_image()), &[("object", "strawberry")]);
    let (status, json) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["errorType"], "service_unavailable");
    assert_eq!(processed_count(dir.path()), 0);
}

#[tokio::test]
async fn test_detected_artifact_is_served() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app(dir.path(), Some(general), None);

    let body = multipart_body(Some(&png_image()), &[("object", "banana")]);
    let (_, json) = send_json(app.clone(), multipart_request("/detect", body)).await;
    let url = json["fileUrl"].as_str().unwrap();
    let path = url.trim_start_matches("http://localhost:5000");

    let response = app
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/jpeg"
    );
}

#[tokio::test]
async fn test_detect_padded_strawberry_target_keeps_detections() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let custom = StubDetector::new("strawberry-yolov5", custom_detections());
    let app = detection_app(dir.path(), Some(general.clone()), Some(custom.clone()));

    let body = multipart_body(Some(&png_image()), &[("object", "  strawberry ")]);
    let (status, json) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(custom.calls(), 1);
    assert_eq!(general.calls(), 0);
    let detections = json["detections"].as_array().unwrap();
    assert_eq!(detections.len(), 2);
    assert!(detections.iter().all(|d| d["name"] == "strawberry"));
}

#[tokio::test]
async fn test_detect_oversize_upload_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let app = detection_app_with_limit(dir.path(), Some(general.clone()), None, 1024);

    let image = noise_png(32, 32);
    assert!(image.len() > 1024);
    let body = multipart_body(Some(&image), &[("object", "banana")]);
    let (status, json) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert_eq!(general.calls(), 0);
    assert_eq!(processed_count(dir.path()), 0);
}

#[tokio::test]
async fn test_detect_raised_limit_accepts_larger_images() {
    let dir = tempfile::tempdir().unwrap();
    let general = StubDetector::new("yolov5s", coco_detections());
    let image = noise_png(32, 32);
    // Headroom for multipart framing and the object field
    let app = detection_app_with_limit(
        dir.path(),
        Some(general.clone()),
        None,
        image.len() + 1024,
    );

    let body = multipart_body(Some(&image), &[("object", "banana")]);
    let (status, _) = send_json(app, multipart_request("/detect", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(general.calls(), 1);
}
