// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use lookback_ai::{
    analysis::MessageAnalyzer,
    api::{analysis_router, detection_router, serve, AnalysisState, AppState},
    config::NodeConfig,
    storage::ArtifactStore,
    version,
    vision::{DetectionModelManager, DetectionPipeline, LabelRoutes, ModelSelector},
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::load();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Starting {}", version::get_version_string());

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    let detection = async {
        if !config.detection_enabled {
            tracing::info!("Detection service disabled");
            return Ok(());
        }

        let models = DetectionModelManager::new(config.detection_models()).await?;
        for selector in [ModelSelector::General, ModelSelector::Custom] {
            if !models.has(selector) {
                tracing::warn!(
                    "⚠️ No {} detection model loaded, requests routed to it will return 503",
                    selector
                );
            }
        }

        let artifacts = ArtifactStore::new(&config.artifacts())
            .context("Failed to prepare the processed image directory")?;
        tracing::info!("Processed images are written to {}", artifacts.processed_dir().display());

        let pipeline = DetectionPipeline::new(models, LabelRoutes::default(), artifacts)
            .with_max_image_bytes(config.max_upload_bytes);
        let app = detection_router(
            AppState::new(pipeline),
            &config.static_dir,
            config.max_upload_bytes,
        );
        serve(config.detection_addr, app, "Detection").await
    };

    let analysis = async {
        if !config.analysis_enabled {
            tracing::info!("Analysis service disabled");
            return Ok(());
        }

        let analyzer = MessageAnalyzer::from_config(&config.analysis())?;
        let app = analysis_router(AnalysisState::new(analyzer));
        serve(config.analysis_addr, app, "Analysis").await
    };

    tokio::select! {
        result = async { tokio::try_join!(detection, analysis).map(|_| ()) } => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
