// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analysis;
pub mod api;
pub mod config;
pub mod storage;
pub mod version;
pub mod vision;

// Re-export main types
pub use analysis::{AnalysisConfig, AnalysisResult, MessageAnalyzer};
pub use api::{analysis_router, detection_router, AnalysisState, ApiError, AppState};
pub use config::NodeConfig;
pub use storage::{ArtifactConfig, ArtifactStore, PersistedArtifact};
pub use vision::{
    Detection, DetectionModelManager, DetectionPipeline, Detector, LabelRoutes, ModelSelector,
};
