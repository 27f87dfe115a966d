// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::analyze::analyze_handler;
use super::detect::detect_handler;
use super::health::{analysis_health_handler, detection_health_handler};
use super::highlight::highlight_handler;
use crate::analysis::MessageAnalyzer;
use crate::storage::STATIC_URL_PATH;
use crate::vision::DetectionPipeline;

/// Shared state of the detection service
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DetectionPipeline>,
}

impl AppState {
    pub fn new(pipeline: DetectionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Shared state of the analysis service
#[derive(Clone)]
pub struct AnalysisState {
    pub analyzer: Arc<MessageAnalyzer>,
}

impl AnalysisState {
    pub fn new(analyzer: MessageAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Routes of the detection service; `static_dir` is served under `/static`
///
/// Bodies above `max_body_bytes` fail while the multipart form is read and are
/// answered with 400.
pub fn detection_router(state: AppState, static_dir: impl AsRef<Path>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(detection_health_handler))
        .route("/detect", post(detect_handler))
        .route("/highlight", post(highlight_handler))
        .nest_service(
            &format!("/{}", STATIC_URL_PATH),
            ServeDir::new(static_dir.as_ref()),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

/// Routes of the analysis service
pub fn analysis_router(state: AnalysisState) -> Router {
    Router::new()
        .route("/health", get(analysis_health_handler))
        .route("/analyze", post(analyze_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

/// Bind `addr` and serve `app` until the process exits
pub async fn serve(addr: SocketAddr, app: Router, service: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {} service to {}: {}", service, addr, e))?;

    tracing::info!("🚀 {} service listening on {}", service, addr);

    axum::serve(listener, app).await?;

    Ok(())
}
