// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Highlight endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use tracing::{debug, warn};

use super::request::HighlightRequest;
use super::response::HighlightResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::upload::UploadForm;

/// POST /highlight - Draw the chosen style around a target object
///
/// # Request (multipart/form-data)
/// - `image`: Image file (required)
/// - `object`: Target label (required)
/// - `highlightMethod`: Rendering style; only "파란 테두리" draws (required)
///
/// # Response
/// - `fileUrl`: URL of the stored, annotated image
///
/// # Errors
/// - 400 Bad Request: Missing field or undecodable image
/// - 503 Service Unavailable: Routed model not loaded
/// - 500 Internal Server Error: Inference or storage failed
pub async fn highlight_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<HighlightResponse>, ApiError> {
    let form = UploadForm::read(multipart).await?;

    let (image, object, method) = HighlightRequest::from_form(&form)
        .into_parts()
        .map_err(|e| {
            warn!("Highlight validation failed: {}", e);
            e
        })?;
    debug!("Highlight request for '{}' with {:?}", object, method);

    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.highlight(&image, &object, &method))
        .await
        .map_err(|e| ApiError::InternalError(format!("Highlight task failed: {}", e)))?
        .map_err(|e| {
            warn!("Highlight failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(HighlightResponse {
        file_url: outcome.artifact.file_url,
    }))
}
