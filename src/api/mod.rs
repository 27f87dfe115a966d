// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;
pub mod detect;
pub mod errors;
pub mod health;
pub mod highlight;
pub mod http_server;
pub mod upload;

pub use analyze::{analyze_handler, AnalyzeRequest};
pub use detect::{detect_handler, DetectRequest, DetectResponse};
pub use errors::{ApiError, ErrorResponse};
pub use health::{AnalysisHealthResponse, AnalysisServices, DetectionHealthResponse};
pub use highlight::{highlight_handler, HighlightRequest, HighlightResponse};
pub use http_server::{analysis_router, detection_router, serve, AnalysisState, AppState};
pub use upload::UploadForm;
