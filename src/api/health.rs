// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Health endpoints for both services

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::http_server::{AnalysisState, AppState};
use crate::version::{FEATURES, VERSION_NUMBER};
use crate::vision::DetectionModelInfo;

/// Detection service health
#[derive(Debug, Clone, Serialize)]
pub struct DetectionHealthResponse {
    pub status: String,
    pub version: String,
    pub features: Vec<String>,
    pub models: Vec<DetectionModelInfo>,
}

/// Analysis service capabilities
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisServices {
    pub extractive_summarization: bool,
    pub zero_shot_emotion_analysis: bool,
}

/// Analysis service health
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisHealthResponse {
    pub status: String,
    pub services: AnalysisServices,
}

/// GET /health on the detection service
pub async fn detection_health_handler(State(state): State<AppState>) -> Json<DetectionHealthResponse> {
    Json(DetectionHealthResponse {
        status: "ok".to_string(),
        version: VERSION_NUMBER.to_string(),
        features: FEATURES.iter().map(|f| f.to_string()).collect(),
        models: state.pipeline.models().list_models(),
    })
}

/// GET /health on the analysis service
pub async fn analysis_health_handler(
    State(state): State<AnalysisState>,
) -> Json<AnalysisHealthResponse> {
    Json(AnalysisHealthResponse {
        status: "ok".to_string(),
        services: AnalysisServices {
            extractive_summarization: true,
            zero_shot_emotion_analysis: state.analyzer.has_classifier(),
        },
    })
}
