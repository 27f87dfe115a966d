// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Every flag can also be set through the environment variable named next to
//! it. A `.env` file is loaded before parsing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::analysis::emotion::DEFAULT_ENTAILMENT_INDEX;
use crate::analysis::AnalysisConfig;
use crate::storage::ArtifactConfig;
use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::yolo::YOLO_INPUT_SIZE;
use crate::vision::DetectionModelConfig;

/// Output classes of an MNLI head: contradiction, neutral, entailment
const NLI_CLASSES: usize = 3;

/// Lookback AI node: object detection and message analysis services
#[derive(Parser, Debug, Clone)]
#[command(name = "lookback-ai")]
#[command(version)]
#[command(about = "Object detection and Korean message analysis services", long_about = None)]
pub struct NodeConfig {
    /// Serve the detection API
    #[arg(long, env = "DETECTION_ENABLED", default_value_t = true, action = clap::ArgAction::Set)]
    pub detection_enabled: bool,

    /// Detection API listen address
    #[arg(long, env = "DETECTION_ADDR", default_value = "0.0.0.0:5000")]
    pub detection_addr: SocketAddr,

    /// Serve the analysis API
    #[arg(long, env = "ANALYSIS_ENABLED", default_value_t = true, action = clap::ArgAction::Set)]
    pub analysis_enabled: bool,

    /// Analysis API listen address
    #[arg(long, env = "ANALYSIS_ADDR", default_value = "0.0.0.0:8000")]
    pub analysis_addr: SocketAddr,

    /// Directory served under /static; processed images go to its `processed` sub-directory
    #[arg(long, env = "STATIC_DIR", default_value = "./static")]
    pub static_dir: PathBuf,

    /// Externally reachable base URL used to build file URLs
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:5000")]
    pub public_base_url: String,

    /// Pretrained COCO YOLOv5 ONNX model
    #[arg(long, env = "GENERAL_MODEL_PATH", default_value = "./models/yolov5s.onnx")]
    pub general_model_path: PathBuf,

    /// Custom strawberry YOLOv5 ONNX model
    #[arg(long, env = "CUSTOM_MODEL_PATH", default_value = "./models/strawberry.onnx")]
    pub custom_model_path: PathBuf,

    /// Class names of the custom model, one per line
    #[arg(long, env = "CUSTOM_LABELS_PATH")]
    pub custom_labels_path: Option<PathBuf>,

    /// Confidence threshold of the general model
    #[arg(long, env = "GENERAL_CONFIDENCE", default_value_t = 0.25)]
    pub general_confidence: f32,

    /// Confidence threshold of the custom model
    #[arg(long, env = "CUSTOM_CONFIDENCE", default_value_t = 0.1)]
    pub custom_confidence: f32,

    /// IoU threshold for non-maximum suppression
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.45)]
    pub iou_threshold: f32,

    /// Square model input size in pixels
    #[arg(long, env = "MODEL_INPUT_SIZE", default_value_t = YOLO_INPUT_SIZE)]
    pub input_size: u32,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = MAX_IMAGE_SIZE)]
    pub max_upload_bytes: usize,

    /// MyMemory-compatible translation endpoint
    #[arg(
        long,
        env = "TRANSLATION_ENDPOINT",
        default_value = "https://api.mymemory.translated.net/get"
    )]
    pub translation_endpoint: String,

    /// Translation request timeout in seconds
    #[arg(long, env = "TRANSLATION_TIMEOUT_SECS", default_value_t = 30)]
    pub translation_timeout_secs: u64,

    /// Zero-shot NLI classifier ONNX model
    #[arg(
        long,
        env = "CLASSIFIER_MODEL_PATH",
        default_value = "./models/bart-large-mnli/model.onnx"
    )]
    pub classifier_model_path: PathBuf,

    /// Tokenizer of the NLI classifier
    #[arg(
        long,
        env = "CLASSIFIER_TOKENIZER_PATH",
        default_value = "./models/bart-large-mnli/tokenizer.json"
    )]
    pub classifier_tokenizer_path: PathBuf,

    /// Output column of the NLI model holding the entailment logit
    #[arg(long, env = "CLASSIFIER_ENTAILMENT_INDEX", default_value_t = DEFAULT_ENTAILMENT_INDEX)]
    pub classifier_entailment_index: usize,
}

impl NodeConfig {
    /// Load `.env`, then parse flags and environment
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::parse()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.detection_enabled && !self.analysis_enabled {
            return Err("At least one service must be enabled".to_string());
        }
        for (name, value) in [
            ("General confidence", self.general_confidence),
            ("Custom confidence", self.custom_confidence),
            ("IoU threshold", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0 and 1, got {}", name, value));
            }
        }
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err(format!(
                "Model input size must be a positive multiple of 32, got {}",
                self.input_size
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err("Upload limit must be greater than 0".to_string());
        }
        if self.translation_timeout_secs == 0 {
            return Err("Translation timeout must be greater than 0".to_string());
        }
        if self.classifier_entailment_index >= NLI_CLASSES {
            return Err(format!(
                "Entailment index must be below {}, got {}",
                NLI_CLASSES, self.classifier_entailment_index
            ));
        }
        if url::Url::parse(&self.public_base_url).is_err() {
            return Err(format!("Invalid public base URL: {}", self.public_base_url));
        }
        if self.detection_enabled
            && self.analysis_enabled
            && self.detection_addr == self.analysis_addr
        {
            return Err("Detection and analysis services cannot share an address".to_string());
        }
        Ok(())
    }

    pub fn detection_models(&self) -> DetectionModelConfig {
        DetectionModelConfig {
            general_model_path: Some(self.general_model_path.to_string_lossy().into_owned()),
            custom_model_path: Some(self.custom_model_path.to_string_lossy().into_owned()),
            custom_labels_path: self
                .custom_labels_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            general_confidence: self.general_confidence,
            custom_confidence: self.custom_confidence,
            iou_threshold: self.iou_threshold,
            input_size: self.input_size,
        }
    }

    pub fn artifacts(&self) -> ArtifactConfig {
        ArtifactConfig {
            static_dir: self.static_dir.clone(),
            public_base_url: self.public_base_url.clone(),
        }
    }

    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            translation_endpoint: self.translation_endpoint.clone(),
            translation_timeout: Duration::from_secs(self.translation_timeout_secs),
            summary_sentences: 1,
            classifier_model_path: Some(self.classifier_model_path.clone()),
            classifier_tokenizer_path: Some(self.classifier_tokenizer_path.clone()),
            entailment_index: self.classifier_entailment_index,
        }
    }
}
