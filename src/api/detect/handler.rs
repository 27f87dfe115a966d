// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::{debug, warn};

use super::request::DetectRequest;
use super::response::DetectResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::UploadForm;

/// POST /detect - Find a target object in an uploaded image
///
/// # Request (multipart/form-data)
/// - `image`: Image file (required)
/// - `object`: Target label, e.g. "banana" or "strawberry" (required)
///
/// # Response
/// - `fileUrl`: URL of the stored (unannotated) image
/// - `detections`: Detections whose name contains the target
///
/// # Errors
/// - 400 Bad Request: Missing field or undecodable image
/// - 503 Service Unavailable: Routed model not loaded
/// - 500 Internal Server Error: Inference or storage failed
pub async fn detect_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DetectResponse>, ApiError> {
    let form = UploadForm::read(multipart).await?;
    let request = DetectRequest::from_form(&form);

    let (image, object) = request.into_parts().map_err(|e| {
        warn!("Detect validation failed: {}", e);
        e
    })?;
    debug!("Detect request for '{}' ({} bytes)", object, image.len());

    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.detect(&image, &object))
        .await
        .map_err(|e| ApiError::InternalError(format!("Detection task failed: {}", e)))?
        .map_err(|e| {
            warn!("Detection failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(DetectResponse {
        file_url: outcome.artifact.file_url,
        detections: outcome.detections,
    }))
}
