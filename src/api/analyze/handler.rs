// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analysis endpoint handler

use axum::{extract::State, Json};
use tracing::{debug, error};

use super::request::AnalyzeRequest;
use crate::analysis::AnalysisResult;
use crate::api::errors::ApiError;
use crate::api::http_server::AnalysisState;

/// POST /analyze - Translate, summarise and classify a Korean message
///
/// Translation and summarization failures degrade to placeholder strings.
///
/// # Errors
/// - 500 Internal Server Error: Emotion classification failed
pub async fn analyze_handler(
    State(state): State<AnalysisState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    debug!("Analyze request: {} chars", request.message.chars().count());

    let result = state.analyzer.analyze(&request.message).await.map_err(|e| {
        error!("Overall analysis failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(result))
}
