// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Zero-shot emotion classification with an NLI model
//!
//! Each candidate label becomes the hypothesis `"This example is {label}."`
//! paired with the input text as premise. The entailment logits of all pairs
//! are softmaxed across labels, so the scores sum to one.
//!
//! The model is expected to be an ONNX export of an MNLI classifier such as
//! bart-large-mnli with a HuggingFace `tokenizer.json`.

use anyhow::{Context, Result};
use ndarray::Array2;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

/// Candidate emotion labels
pub const EMOTION_LABELS: [&str; 11] = [
    "anger",
    "disgust",
    "fear",
    "joy",
    "neutral",
    "sadness",
    "surprise",
    "excitement",
    "contentment",
    "anxiety",
    "boredom",
];

/// Hypothesis template; `{}` is replaced by the label
pub const HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

/// Entailment column of the MNLI head (contradiction, neutral, entailment)
pub const DEFAULT_ENTAILMENT_INDEX: usize = 2;

const MAX_SEQUENCE_LENGTH: usize = 1024;

/// One label with its probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("No candidate labels given")]
    NoLabels,

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Classifier inference failed: {0}")]
    Inference(String),

    #[error("Unexpected classifier output: {0}")]
    InvalidOutput(String),
}

/// Scores a text against a set of candidate labels
pub trait EmotionClassifier: Send + Sync {
    fn name(&self) -> &str;

    /// Every label with its score, sorted by descending score
    fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<EmotionScore>, ClassifierError>;
}

/// Numerically stable softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Pair labels with their entailment logits, normalise and sort descending
pub fn rank_labels(labels: &[&str], entailment_logits: &[f32]) -> Vec<EmotionScore> {
    let mut scores: Vec<EmotionScore> = labels
        .iter()
        .zip(softmax(entailment_logits))
        .map(|(label, score)| EmotionScore {
            label: label.to_string(),
            score,
        })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

pub fn hypothesis_for(label: &str) -> String {
    HYPOTHESIS_TEMPLATE.replace("{}", label)
}

/// ONNX NLI classifier
#[derive(Clone)]
pub struct OnnxZeroShotClassifier {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    /// Whether the graph takes `token_type_ids` (BERT-style exports do, BART does not)
    uses_token_type_ids: bool,
    entailment_index: usize,
}

impl std::fmt::Debug for OnnxZeroShotClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxZeroShotClassifier")
            .field("model_name", &self.model_name)
            .field("uses_token_type_ids", &self.uses_token_type_ids)
            .field("entailment_index", &self.entailment_index)
            .finish_non_exhaustive()
    }
}

impl OnnxZeroShotClassifier {
    /// Load the NLI model and its tokenizer
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file not found
    /// - ONNX Runtime initialization fails
    pub fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Classifier model not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("Loading zero-shot classifier '{}' from {}", model_name, model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load classifier model from {}",
                model_path.display()
            ))?;

        let uses_token_type_ids = session.inputs.iter().any(|i| i.name == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("Failed to configure truncation: {}", e))?;

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            uses_token_type_ids,
            entailment_index: DEFAULT_ENTAILMENT_INDEX,
        })
    }

    /// Override the entailment column for models with a different label order
    pub fn with_entailment_index(mut self, index: usize) -> Self {
        self.entailment_index = index;
        self
    }

    fn entailment_logit(&self, premise: &str, hypothesis: &str) -> Result<f32, ClassifierError> {
        let encoding = self
            .tokenizer
            .encode((premise, hypothesis), true)
            .map_err(|e| ClassifierError::Tokenization(e.to_string()))?;

        let to_row = |values: &[u32]| -> Result<Array2<i64>, ClassifierError> {
            let row: Vec<i64> = values.iter().map(|&v| v as i64).collect();
            Array2::from_shape_vec((1, row.len()), row)
                .map_err(|e| ClassifierError::Inference(e.to_string()))
        };
        let value = |array: Array2<i64>| {
            Value::from_array(array).map_err(|e| ClassifierError::Inference(e.to_string()))
        };

        let input_ids = value(to_row(encoding.get_ids())?)?;
        let attention_mask = value(to_row(encoding.get_attention_mask())?)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("classifier session lock poisoned".to_string()))?;

        let run_result = if self.uses_token_type_ids {
            let token_type_ids = value(to_row(encoding.get_type_ids())?)?;
            session.run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids
            ])
        } else {
            session.run(ort::inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask
            ])
        };
        let outputs = run_result.map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let logits = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| ClassifierError::InvalidOutput(e.to_string()))?;

        logits
            .iter()
            .nth(self.entailment_index)
            .copied()
            .ok_or_else(|| {
                ClassifierError::InvalidOutput(format!(
                    "expected at least {} logits, got shape {:?}",
                    self.entailment_index + 1,
                    logits.shape()
                ))
            })
    }
}

impl EmotionClassifier for OnnxZeroShotClassifier {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<EmotionScore>, ClassifierError> {
        if labels.is_empty() {
            return Err(ClassifierError::NoLabels);
        }

        let logits = labels
            .iter()
            .map(|label| self.entailment_logit(text, &hypothesis_for(label)))
            .collect::<Result<Vec<f32>, _>>()?;

        debug!("Entailment logits for {} labels: {:?}", labels.len(), logits);

        Ok(rank_labels(labels, &logits))
    }
}
