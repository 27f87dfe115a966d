// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for the endpoint tests: stub detectors, multipart bodies
//! and router construction.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use image::DynamicImage;
use lookback_ai::{
    analysis::{Language, MessageAnalyzer, TranslationError, Translator},
    api::{analysis_router, detection_router, AnalysisState, AppState},
    storage::{ArtifactConfig, ArtifactStore},
    vision::{
        BoundingBox, Detection, DetectionModelManager, DetectionPipeline, Detector, LabelRoutes,
    },
};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt;

pub const BOUNDARY: &str = "----lookback-test-boundary";
pub const MAX_BODY: usize = 10 * 1024 * 1024;

/// Detector returning a fixed list and counting calls
pub struct StubDetector {
    pub name: &'static str,
    pub detections: Vec<Detection>,
    pub calls: AtomicUsize,
}

impl StubDetector {
    pub fn new(name: &'static str, detections: Vec<Detection>) -> Arc<Self> {
        Arc::new(Self {
            name,
            detections,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for StubDetector {
    fn name(&self) -> &str {
        self.name
    }

    fn infer(&self, _image: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.detections.clone())
    }
}

/// What the pretrained model "sees" in every test image
pub fn coco_detections() -> Vec<Detection> {
    vec![
        Detection::new(46, "banana", 0.91, BoundingBox::new(4.0, 4.0, 30.0, 20.0)),
        Detection::new(47, "apple", 0.77, BoundingBox::new(40.0, 10.0, 60.0, 40.0)),
        Detection::new(49, "orange", 0.35, BoundingBox::new(10.0, 30.0, 25.0, 45.0)),
    ]
}

/// Raw output of the custom model before normalisation
pub fn custom_detections() -> Vec<Detection> {
    vec![
        Detection::new(0, "strawberry", 0.62, BoundingBox::new(8.0, 8.0, 28.0, 28.0)),
        Detection::new(0, "strawberry", 0.15, BoundingBox::new(35.0, 12.0, 55.0, 30.0)),
    ]
}

/// Encoded 64x48 white PNG
pub fn png_image() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        64,
        48,
        image::Rgb([255, 255, 255]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode test image");
    buf
}

/// Encoded PNG of pseudo-random pixels; compresses poorly
pub fn noise_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x1234_5678;
    let img = image::RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        image::Rgb([next(), next(), next()])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode noise image");
    buf
}

/// Build a multipart/form-data body from optional image bytes and text fields
pub fn multipart_body(image: Option<&[u8]>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"fruits.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("build request")
}

/// Detection router over `static_dir` with the given model slots
pub fn detection_app(
    static_dir: &Path,
    general: Option<Arc<dyn Detector>>,
    custom: Option<Arc<dyn Detector>>,
) -> Router {
    detection_app_with_limit(static_dir, general, custom, MAX_BODY)
}

/// Detection router with a custom upload limit
pub fn detection_app_with_limit(
    static_dir: &Path,
    general: Option<Arc<dyn Detector>>,
    custom: Option<Arc<dyn Detector>>,
    max_upload_bytes: usize,
) -> Router {
    let artifacts = ArtifactStore::new(&ArtifactConfig {
        static_dir: static_dir.to_path_buf(),
        public_base_url: "http://localhost:5000".to_string(),
    })
    .expect("artifact store");

    let pipeline = DetectionPipeline::new(
        DetectionModelManager::from_detectors(general, custom),
        LabelRoutes::default(),
        artifacts,
    )
    .with_max_image_bytes(max_upload_bytes);
    detection_router(AppState::new(pipeline), static_dir, max_upload_bytes)
}

/// Send one request and return status plus JSON body
pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Number of files in the processed directory
pub fn processed_count(static_dir: &Path) -> usize {
    std::fs::read_dir(static_dir.join("processed"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

/// Translator answering from a fixed KO->EN text
pub struct StubTranslator {
    pub english: Option<String>,
}

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        _target: Language,
    ) -> Result<String, TranslationError> {
        match source {
            Language::Korean => self.english.clone().ok_or(TranslationError::ApiError {
                status: 503,
                message: "unavailable".to_string(),
            }),
            Language::English => Ok(format!("[ko] {}", text)),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

pub fn analysis_app(english: Option<&str>) -> Router {
    let translator = StubTranslator {
        english: english.map(str::to_string),
    };
    let analyzer = MessageAnalyzer::new(Arc::new(translator), None);
    analysis_router(AnalysisState::new(analyzer))
}
